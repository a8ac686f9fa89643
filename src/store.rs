//! # Store Module
//!
//! Persistence contract for user profiles, conversation history and the
//! per-user diary and progress journals, plus an in-memory implementation.
//! The Postgres implementation lives in [`crate::db`].

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::profile::{HistoryEntry, ProfileParams, UserProfile};

/// Append-only per-user journals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JournalKind {
    /// Body measurements and weigh-ins
    Progress,
    /// Food diary
    Diary,
}

impl JournalKind {
    pub fn table_name(&self) -> &'static str {
        match self {
            JournalKind::Progress => "progress_entries",
            JournalKind::Diary => "diary_entries",
        }
    }
}

/// One timestamped journal entry
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Storage operations needed by the bot
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a profile, `None` if the user never contacted the bot
    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Create the profile on first contact (free tier), otherwise refresh the display name
    async fn upsert_user(&self, user_id: &str, name: &str) -> Result<UserProfile>;

    /// Store the complete onboarding parameters in one write
    async fn save_params(&self, user_id: &str, params: &ProfileParams) -> Result<()>;

    /// Replace the goal of an onboarded profile. Returns `false` when the
    /// profile has no parameters yet.
    async fn update_goal(&self, user_id: &str, goal: &str) -> Result<bool>;

    /// Replace the stored conversation history
    async fn save_history(&self, user_id: &str, history: &[HistoryEntry]) -> Result<()>;

    /// Append a journal entry stamped with the current time
    async fn add_entry(&self, user_id: &str, kind: JournalKind, text: &str) -> Result<JournalEntry>;

    /// Most recent journal entries, newest first
    async fn recent_entries(
        &self,
        user_id: &str,
        kind: JournalKind,
        limit: i64,
    ) -> Result<Vec<JournalEntry>>;
}

/// Process-local store. State is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, UserProfile>>,
    journals: Mutex<HashMap<(String, JournalKind), Vec<JournalEntry>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing_user(user_id: &str) -> anyhow::Error {
    anyhow::anyhow!("User {user_id} not found")
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.users.lock().await.get(user_id).cloned())
    }

    async fn upsert_user(&self, user_id: &str, name: &str) -> Result<UserProfile> {
        let mut users = self.users.lock().await;
        let profile = users
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::new(user_id, name));
        profile.name = name.to_string();
        Ok(profile.clone())
    }

    async fn save_params(&self, user_id: &str, params: &ProfileParams) -> Result<()> {
        let mut users = self.users.lock().await;
        let profile = users.get_mut(user_id).ok_or_else(|| missing_user(user_id))?;
        profile.params = Some(params.clone());
        Ok(())
    }

    async fn update_goal(&self, user_id: &str, goal: &str) -> Result<bool> {
        let mut users = self.users.lock().await;
        let profile = users.get_mut(user_id).ok_or_else(|| missing_user(user_id))?;
        match profile.params.as_mut() {
            Some(params) => {
                params.goal = goal.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn save_history(&self, user_id: &str, history: &[HistoryEntry]) -> Result<()> {
        let mut users = self.users.lock().await;
        let profile = users.get_mut(user_id).ok_or_else(|| missing_user(user_id))?;
        profile.history = history.to_vec();
        Ok(())
    }

    async fn add_entry(&self, user_id: &str, kind: JournalKind, text: &str) -> Result<JournalEntry> {
        let mut journals = self.journals.lock().await;
        let entries = journals.entry((user_id.to_string(), kind)).or_default();
        let entry = JournalEntry {
            id: entries.len() as i64 + 1,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn recent_entries(
        &self,
        user_id: &str,
        kind: JournalKind,
        limit: i64,
    ) -> Result<Vec<JournalEntry>> {
        let journals = self.journals.lock().await;
        let limit = usize::try_from(limit.max(0)).unwrap_or(0);
        Ok(journals
            .get(&(user_id.to_string(), kind))
            .map(|entries| entries.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
