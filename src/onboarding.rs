//! # Onboarding Module
//!
//! The profile questionnaire every user completes once before free-form
//! questions are accepted. One question per turn, in a fixed order, answers
//! stored verbatim. Parameters are committed to the store only when the last
//! answer arrives.

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::profile::{ProfileParams, UserProfile};
use crate::store::UserStore;

/// Activity factor used when the answer carries no "(x.y)" factor
pub const DEFAULT_ACTIVITY_FACTOR: f64 = 1.2;

lazy_static! {
    static ref ACTIVITY_FACTOR_REGEX: Regex =
        Regex::new(r"\((\d+(?:[.,]\d+)?)\)").expect("Activity factor pattern should be valid");
}

/// Questionnaire steps in the order they are asked
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnboardingStep {
    #[default]
    Gender,
    Weight,
    Height,
    Age,
    Health,
    Goal,
    Activity,
}

impl OnboardingStep {
    pub const ORDER: [OnboardingStep; 7] = [
        OnboardingStep::Gender,
        OnboardingStep::Weight,
        OnboardingStep::Height,
        OnboardingStep::Age,
        OnboardingStep::Health,
        OnboardingStep::Goal,
        OnboardingStep::Activity,
    ];

    /// The step asked after this one, `None` after the last
    pub fn next(self) -> Option<Self> {
        match self {
            OnboardingStep::Gender => Some(OnboardingStep::Weight),
            OnboardingStep::Weight => Some(OnboardingStep::Height),
            OnboardingStep::Height => Some(OnboardingStep::Age),
            OnboardingStep::Age => Some(OnboardingStep::Health),
            OnboardingStep::Health => Some(OnboardingStep::Goal),
            OnboardingStep::Goal => Some(OnboardingStep::Activity),
            OnboardingStep::Activity => None,
        }
    }

    /// Localization key of the question
    pub fn prompt_key(self) -> &'static str {
        match self {
            OnboardingStep::Gender => "onboarding-gender",
            OnboardingStep::Weight => "onboarding-weight",
            OnboardingStep::Height => "onboarding-height",
            OnboardingStep::Age => "onboarding-age",
            OnboardingStep::Health => "onboarding-health",
            OnboardingStep::Goal => "onboarding-goal",
            OnboardingStep::Activity => "onboarding-activity",
        }
    }
}

/// Answers collected so far
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OnboardingAnswers {
    pub gender: Option<String>,
    pub weight: Option<String>,
    pub height: Option<String>,
    pub age: Option<String>,
    pub health: Option<String>,
    pub goal: Option<String>,
}

/// In-progress questionnaire: answers plus the step being asked
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OnboardingSession {
    pub step: OnboardingStep,
    pub answers: OnboardingAnswers,
}

/// Result of recording one answer
#[derive(Clone, Debug, PartialEq)]
pub enum OnboardingAdvance {
    /// More questions remain
    Next(OnboardingSession),
    /// All answers collected
    Complete(ProfileParams),
}

impl OnboardingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` verbatim against the current step and move the cursor
    pub fn record(mut self, text: &str) -> OnboardingAdvance {
        let answer = text.to_string();
        match self.step {
            OnboardingStep::Gender => self.answers.gender = Some(answer),
            OnboardingStep::Weight => self.answers.weight = Some(answer),
            OnboardingStep::Height => self.answers.height = Some(answer),
            OnboardingStep::Age => self.answers.age = Some(answer),
            OnboardingStep::Health => self.answers.health = Some(answer),
            OnboardingStep::Goal => self.answers.goal = Some(answer),
            OnboardingStep::Activity => {
                let answers = self.answers;
                return OnboardingAdvance::Complete(ProfileParams {
                    gender: answers.gender.unwrap_or_default(),
                    weight: answers.weight.unwrap_or_default(),
                    height: answers.height.unwrap_or_default(),
                    age: answers.age.unwrap_or_default(),
                    health: answers.health.unwrap_or_default(),
                    goal: answers.goal.unwrap_or_default(),
                    activity_factor: parse_activity_factor(text),
                });
            }
        }

        if let Some(next) = self.step.next() {
            self.step = next;
        }
        OnboardingAdvance::Next(self)
    }
}

/// Extract the factor in parentheses ("Light activity (1.375)" → 1.375)
pub fn parse_activity_factor(text: &str) -> f64 {
    ACTIVITY_FACTOR_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
        .unwrap_or(DEFAULT_ACTIVITY_FACTOR)
}

/// Record an answer and commit the parameters to the store once complete
pub async fn advance_onboarding(
    store: &dyn UserStore,
    user_id: &str,
    session: OnboardingSession,
    text: &str,
) -> Result<OnboardingAdvance> {
    let advance = session.record(text);

    if let OnboardingAdvance::Complete(params) = &advance {
        store.save_params(user_id, params).await?;
        info!(user_id = %user_id, activity_factor = params.activity_factor, "Onboarding completed");
    }

    Ok(advance)
}

/// What `/start` does for a given profile
#[derive(Clone, Debug, PartialEq)]
pub enum StartAction {
    /// Profile already complete: straight to the main menu
    MainMenu,
    /// Ask the questionnaire from the first step
    BeginOnboarding(OnboardingSession),
}

impl StartAction {
    pub fn for_profile(profile: &UserProfile) -> Self {
        if profile.is_onboarded() {
            StartAction::MainMenu
        } else {
            StartAction::BeginOnboarding(OnboardingSession::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order_matches_next() {
        for pair in OnboardingStep::ORDER.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert_eq!(OnboardingStep::Activity.next(), None);
    }

    #[test]
    fn test_parse_activity_factor() {
        assert_eq!(parse_activity_factor("Light activity (1.375)"), 1.375);
        assert_eq!(parse_activity_factor("Высокая (1,725)"), 1.725);
        assert_eq!(parse_activity_factor("I walk a lot"), DEFAULT_ACTIVITY_FACTOR);
    }

    #[test]
    fn test_answers_stored_verbatim() {
        let session = OnboardingSession::new();
        match session.record("  not really a gender ") {
            OnboardingAdvance::Next(session) => {
                assert_eq!(session.step, OnboardingStep::Weight);
                assert_eq!(
                    session.answers.gender.as_deref(),
                    Some("  not really a gender ")
                );
            }
            other => panic!("Unexpected advance: {other:?}"),
        }
    }
}
