//! Dialogue module holding per-user conversation state.
//!
//! State lives in teloxide's in-memory storage: a restart drops it. Users
//! whose profile was never completed are sent back to the first onboarding
//! question on their next message; onboarded users land in the main menu.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::onboarding::OnboardingSession;

/// Represents the conversation state of a user
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum BotDialogueState {
    #[default]
    Start,
    /// Profile questionnaire in progress
    Onboarding { session: OnboardingSession },
    /// Free-form questions and menu navigation
    MainMenu,
    WaitingForGoal,
    WaitingForDiaryEntry,
    WaitingForProgressEntry,
}

impl BotDialogueState {
    /// Whether the state is waiting for a free-text value that `/cancel` can abort
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            BotDialogueState::WaitingForGoal
                | BotDialogueState::WaitingForDiaryEntry
                | BotDialogueState::WaitingForProgressEntry
        )
    }
}

/// Text handed to the handler of `state`. Onboarding answers are stored
/// exactly as sent; every other state works on the trimmed text.
pub fn state_input<'a>(state: &BotDialogueState, raw: &'a str) -> &'a str {
    match state {
        BotDialogueState::Onboarding { .. } => raw,
        _ => raw.trim(),
    }
}

/// Type alias for our dialogue
pub type BotDialogue = Dialogue<BotDialogueState, InMemStorage<BotDialogueState>>;

/// Validates a free-text journal or goal input
pub fn validate_entry_text(text: &str) -> Result<String, &'static str> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.chars().count() > 1000 {
        return Err("too_long");
    }

    Ok(trimmed.to_string())
}
