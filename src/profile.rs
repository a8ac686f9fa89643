//! # Profile Module
//!
//! User profile data model: subscription tier, the onboarding parameters and the
//! bounded conversation history kept for model context.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of history entries retained per user
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Subscription tier of a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subscription {
    #[default]
    Free,
    Paid,
}

impl Subscription {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subscription::Free => "free",
            Subscription::Paid => "paid",
        }
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subscription {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Subscription::Free),
            "paid" => Ok(Subscription::Paid),
            other => Err(anyhow::anyhow!("Unknown subscription tier: {other}")),
        }
    }
}

/// Profile parameters collected during onboarding.
///
/// Every field except `activity_factor` is the user's answer stored verbatim.
/// A value of this type only exists once all answers have been collected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileParams {
    pub gender: String,
    pub weight: String,
    pub height: String,
    pub age: String,
    pub health: String,
    pub goal: String,
    pub activity_factor: f64,
}

/// Who produced a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Bot,
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub text: String,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::Bot,
            text: text.into(),
        }
    }
}

/// Stored user profile, one per Telegram user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub subscription: Subscription,
    /// `None` until onboarding has been completed
    #[serde(default)]
    pub params: Option<ProfileParams>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl UserProfile {
    /// Profile as created on first contact
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            subscription: Subscription::Free,
            params: None,
            history: Vec::new(),
        }
    }

    pub fn is_onboarded(&self) -> bool {
        self.params.is_some()
    }

    /// Most recent `count` history entries, oldest first
    pub fn recent_history(&self, count: usize) -> &[HistoryEntry] {
        let start = self.history.len().saturating_sub(count);
        &self.history[start..]
    }
}

/// Truncate history to the most recent `window` entries, evicting the oldest first
pub fn truncate_history(history: &mut Vec<HistoryEntry>, window: usize) {
    if history.len() > window {
        let excess = history.len() - window;
        history.drain(..excess);
    }
}

/// Append a (user, bot) turn pair and enforce the retention window
pub fn push_turn(history: &mut Vec<HistoryEntry>, user_text: &str, bot_text: &str, window: usize) {
    history.push(HistoryEntry::user(user_text));
    history.push(HistoryEntry::bot(bot_text));
    truncate_history(history, window);
}
