use anyhow::Result;

use fitbot::dialogue::{state_input, validate_entry_text, BotDialogueState};
use fitbot::onboarding::{advance_onboarding, OnboardingAdvance, OnboardingSession, OnboardingStep};
use fitbot::store::{InMemoryUserStore, UserStore};

/// Dialogue states survive a serde round trip with the session inside
#[tokio::test]
async fn test_dialogue_state_serialization() -> Result<()> {
    let session = match OnboardingSession::new().record("Female") {
        OnboardingAdvance::Next(session) => session,
        OnboardingAdvance::Complete(_) => panic!("expected next step"),
    };

    let state = BotDialogueState::Onboarding { session };
    let json = serde_json::to_string(&state)?;
    let restored: BotDialogueState = serde_json::from_str(&json)?;

    match restored {
        BotDialogueState::Onboarding { session } => {
            assert_eq!(session.step, OnboardingStep::Weight);
            assert_eq!(session.answers.gender.as_deref(), Some("Female"));
        }
        _ => panic!("Unexpected dialogue state"),
    }

    Ok(())
}

#[test]
fn test_default_state_is_start() {
    assert_eq!(BotDialogueState::default(), BotDialogueState::Start);
}

#[test]
fn test_cancellable_states() {
    assert!(BotDialogueState::WaitingForGoal.is_cancellable());
    assert!(BotDialogueState::WaitingForDiaryEntry.is_cancellable());
    assert!(BotDialogueState::WaitingForProgressEntry.is_cancellable());
    assert!(!BotDialogueState::MainMenu.is_cancellable());
    assert!(!BotDialogueState::Onboarding {
        session: OnboardingSession::new()
    }
    .is_cancellable());
}

#[test]
fn test_entry_text_validation() {
    assert_eq!(validate_entry_text("  Ran 5 km  ").unwrap(), "Ran 5 km");
    assert_eq!(validate_entry_text("   "), Err("empty"));
    assert_eq!(validate_entry_text(&"a".repeat(1001)), Err("too_long"));
    assert!(validate_entry_text(&"a".repeat(1000)).is_ok());
}

#[test]
fn test_state_input_trims_outside_onboarding() {
    let onboarding = BotDialogueState::Onboarding {
        session: OnboardingSession::new(),
    };
    assert_eq!(state_input(&onboarding, " 70 kg "), " 70 kg ");
    assert_eq!(state_input(&BotDialogueState::MainMenu, " 👤 My profile "), "👤 My profile");
    assert_eq!(state_input(&BotDialogueState::WaitingForDiaryEntry, " salad\n"), "salad");
}

/// An answer routed from the onboarding state is recorded exactly as sent
#[tokio::test]
async fn test_routed_onboarding_answer_is_verbatim() -> Result<()> {
    let store = InMemoryUserStore::new();
    store.upsert_user("8", "G").await?;

    let session = match OnboardingSession::new().record("Male") {
        OnboardingAdvance::Next(session) => session,
        OnboardingAdvance::Complete(_) => panic!("expected next step"),
    };
    let state = BotDialogueState::Onboarding {
        session: session.clone(),
    };

    let text = state_input(&state, " 70 kg ");
    match advance_onboarding(&store, "8", session, text).await? {
        OnboardingAdvance::Next(next) => {
            assert_eq!(next.step, OnboardingStep::Height);
            assert_eq!(next.answers.weight.as_deref(), Some(" 70 kg "));
        }
        OnboardingAdvance::Complete(_) => panic!("expected next step"),
    }
    Ok(())
}
