//! Dialogue Manager module for handling dialogue state transitions

use anyhow::Result;
use teloxide::prelude::*;
use tracing::{info, warn};

use crate::dialogue::{validate_entry_text, BotDialogue, BotDialogueState};
use crate::localization::{t_args_lang, t_lang};
use crate::nutrition::estimate_from_params;
use crate::onboarding::{advance_onboarding, OnboardingAdvance, OnboardingSession, OnboardingStep};
use crate::profile::UserProfile;
use crate::store::JournalKind;

use super::chat_handler::send_rich_text;
use super::context::BotContext;
use super::menu::is_cancel;
use super::ui_builder::{
    create_cancel_keyboard, create_goal_change_keyboard, create_main_menu_keyboard, format_journal,
    format_kbju, format_profile, onboarding_markup,
};

/// Localization keys of a journal: prompt, saved, empty, title
fn journal_keys(kind: JournalKind) -> (&'static str, &'static str, &'static str, &'static str) {
    match kind {
        JournalKind::Diary => ("diary-prompt", "diary-saved", "diary-empty", "diary-title"),
        JournalKind::Progress => (
            "progress-prompt",
            "progress-saved",
            "progress-empty",
            "progress-title",
        ),
    }
}

/// Ask an onboarding question with its keyboard
pub async fn send_onboarding_question(
    bot: &Bot,
    chat_id: ChatId,
    step: OnboardingStep,
    language_code: Option<&str>,
) -> Result<()> {
    bot.send_message(chat_id, t_lang(step.prompt_key(), language_code))
        .reply_markup(onboarding_markup(step, language_code))
        .await?;
    Ok(())
}

/// Enter the questionnaire and ask the session's current question
pub async fn begin_onboarding(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &BotDialogue,
    session: OnboardingSession,
    language_code: Option<&str>,
) -> Result<()> {
    let step = session.step;
    dialogue
        .update(BotDialogueState::Onboarding { session })
        .await?;

    bot.send_message(chat_id, t_lang("onboarding-intro", language_code))
        .await?;
    send_onboarding_question(bot, chat_id, step, language_code).await
}

/// Switch to the main menu and show its keyboard along with `message`
pub async fn show_main_menu(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &BotDialogue,
    message: String,
    language_code: Option<&str>,
) -> Result<()> {
    dialogue.update(BotDialogueState::MainMenu).await?;
    send_rich_text(
        bot,
        chat_id,
        &message,
        Some(create_main_menu_keyboard(language_code).into()),
    )
    .await
}

/// Handle an answer to the current onboarding question
#[allow(clippy::too_many_arguments)]
pub async fn handle_onboarding_input(
    bot: &Bot,
    msg: &Message,
    dialogue: &BotDialogue,
    ctx: &BotContext,
    user_id: &str,
    session: OnboardingSession,
    text: &str,
    language_code: Option<&str>,
) -> Result<()> {
    match advance_onboarding(ctx.store.as_ref(), user_id, session, text).await? {
        OnboardingAdvance::Next(session) => {
            let step = session.step;
            dialogue
                .update(BotDialogueState::Onboarding { session })
                .await?;
            send_onboarding_question(bot, msg.chat.id, step, language_code).await
        }
        OnboardingAdvance::Complete(_) => {
            show_main_menu(
                bot,
                msg.chat.id,
                dialogue,
                t_lang("onboarding-complete", language_code),
                language_code,
            )
            .await
        }
    }
}

/// Show the stored profile
pub async fn show_profile(
    bot: &Bot,
    chat_id: ChatId,
    profile: &UserProfile,
    language_code: Option<&str>,
) -> Result<()> {
    send_rich_text(bot, chat_id, &format_profile(profile, language_code), None).await
}

/// Calculate KBJU from the profile; invalid data restarts the questionnaire
pub async fn show_kbju(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &BotDialogue,
    profile: &UserProfile,
    language_code: Option<&str>,
) -> Result<()> {
    let params = match &profile.params {
        Some(params) => params,
        None => {
            bot.send_message(chat_id, t_lang("profile-not-ready", language_code))
                .await?;
            return Ok(());
        }
    };

    match estimate_from_params(params) {
        Ok(estimate) => {
            info!(user_id = %profile.user_id, calories = estimate.calories, "KBJU calculated");
            send_rich_text(bot, chat_id, &format_kbju(&estimate, language_code), None).await
        }
        Err(e) => {
            warn!(user_id = %profile.user_id, error = %e, "Invalid profile data for KBJU");
            bot.send_message(chat_id, t_lang("kbju-invalid-data", language_code))
                .await?;
            begin_onboarding(bot, chat_id, dialogue, OnboardingSession::new(), language_code).await
        }
    }
}

/// Ask for a new goal
pub async fn begin_goal_change(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &BotDialogue,
    profile: &UserProfile,
    language_code: Option<&str>,
) -> Result<()> {
    if !profile.is_onboarded() {
        bot.send_message(chat_id, t_lang("goal-no-profile", language_code))
            .await?;
        return Ok(());
    }

    dialogue.update(BotDialogueState::WaitingForGoal).await?;
    bot.send_message(chat_id, t_lang("goal-prompt", language_code))
        .reply_markup(create_goal_change_keyboard(language_code))
        .await?;
    Ok(())
}

/// Handle the new goal text
pub async fn handle_goal_input(
    bot: &Bot,
    msg: &Message,
    dialogue: &BotDialogue,
    ctx: &BotContext,
    user_id: &str,
    text: &str,
    language_code: Option<&str>,
) -> Result<()> {
    if is_cancel(text) {
        return cancel_input(bot, msg.chat.id, dialogue, language_code).await;
    }

    let goal = match validate_entry_text(text) {
        Ok(goal) => goal,
        Err(_) => {
            // Keep waiting, the user can try again
            bot.send_message(msg.chat.id, t_lang("goal-prompt", language_code))
                .await?;
            return Ok(());
        }
    };

    let message = if ctx.store.update_goal(user_id, &goal).await? {
        info!(user_id = %user_id, "Goal updated");
        t_args_lang("goal-updated", &[("goal", &goal)], language_code)
    } else {
        t_lang("goal-no-profile", language_code)
    };

    show_main_menu(bot, msg.chat.id, dialogue, message, language_code).await
}

/// Ask for a diary or progress entry
pub async fn begin_journal_entry(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &BotDialogue,
    kind: JournalKind,
    language_code: Option<&str>,
) -> Result<()> {
    let state = match kind {
        JournalKind::Diary => BotDialogueState::WaitingForDiaryEntry,
        JournalKind::Progress => BotDialogueState::WaitingForProgressEntry,
    };
    dialogue.update(state).await?;

    let (prompt_key, ..) = journal_keys(kind);
    bot.send_message(chat_id, t_lang(prompt_key, language_code))
        .reply_markup(create_cancel_keyboard(language_code))
        .await?;
    Ok(())
}

/// Store a diary or progress entry
#[allow(clippy::too_many_arguments)]
pub async fn handle_journal_input(
    bot: &Bot,
    msg: &Message,
    dialogue: &BotDialogue,
    ctx: &BotContext,
    user_id: &str,
    kind: JournalKind,
    text: &str,
    language_code: Option<&str>,
) -> Result<()> {
    if is_cancel(text) {
        return cancel_input(bot, msg.chat.id, dialogue, language_code).await;
    }

    let (prompt_key, saved_key, ..) = journal_keys(kind);
    let entry_text = match validate_entry_text(text) {
        Ok(entry_text) => entry_text,
        Err(_) => {
            // Keep waiting, the user can try again
            bot.send_message(msg.chat.id, t_lang(prompt_key, language_code))
                .await?;
            return Ok(());
        }
    };

    ctx.store.add_entry(user_id, kind, &entry_text).await?;
    show_main_menu(
        bot,
        msg.chat.id,
        dialogue,
        t_lang(saved_key, language_code),
        language_code,
    )
    .await
}

/// List the latest diary or progress entries
pub async fn show_journal(
    bot: &Bot,
    chat_id: ChatId,
    ctx: &BotContext,
    user_id: &str,
    kind: JournalKind,
    language_code: Option<&str>,
) -> Result<()> {
    let (_, _, empty_key, title_key) = journal_keys(kind);
    let entries = ctx
        .store
        .recent_entries(user_id, kind, ctx.settings.journal_limit)
        .await?;

    if entries.is_empty() {
        bot.send_message(chat_id, t_lang(empty_key, language_code))
            .await?;
        return Ok(());
    }

    send_rich_text(
        bot,
        chat_id,
        &format_journal(&t_lang(title_key, language_code), &entries),
        None,
    )
    .await
}

/// Leave a waiting state without saving anything
pub async fn cancel_input(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &BotDialogue,
    language_code: Option<&str>,
) -> Result<()> {
    show_main_menu(
        bot,
        chat_id,
        dialogue,
        t_lang("cancelled", language_code),
        language_code,
    )
    .await
}
