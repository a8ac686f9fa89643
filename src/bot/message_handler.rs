//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, info};

use crate::dialogue::{state_input, BotDialogue, BotDialogueState};
use crate::localization::{t_args_lang, t_lang};
use crate::onboarding::{OnboardingSession, StartAction};
use crate::profile::UserProfile;
use crate::store::JournalKind;

use super::chat_handler::{handle_free_form_message, send_rich_text};
use super::context::BotContext;
use super::dialogue_manager::{
    begin_goal_change, begin_journal_entry, begin_onboarding, cancel_input,
    handle_goal_input, handle_journal_input, handle_onboarding_input, send_onboarding_question,
    show_journal, show_kbju, show_main_menu, show_profile,
};
use super::menu::{parse_command, resolve_menu_action, BotCommand, MenuAction};

/// Identity of the sender of a message
struct Sender<'a> {
    user_id: String,
    name: String,
    language_code: Option<&'a str>,
}

impl<'a> Sender<'a> {
    fn from_message(msg: &'a Message) -> Option<Self> {
        let user = msg.from.as_ref()?;
        Some(Self {
            user_id: user.id.to_string(),
            name: user.full_name(),
            language_code: user.language_code.as_deref(),
        })
    }
}

/// Handle /start: register the user, then onboarding or the main menu
async fn handle_start(
    bot: &Bot,
    msg: &Message,
    dialogue: &BotDialogue,
    ctx: &BotContext,
    sender: &Sender<'_>,
) -> Result<()> {
    let profile = ctx.store.upsert_user(&sender.user_id, &sender.name).await?;
    let language_code = sender.language_code;

    match StartAction::for_profile(&profile) {
        StartAction::MainMenu => {
            debug!(user_id = %sender.user_id, "Profile complete, skipping onboarding");
            let message = t_args_lang("welcome-back", &[("name", &sender.name)], language_code);
            show_main_menu(bot, msg.chat.id, dialogue, message, language_code).await
        }
        StartAction::BeginOnboarding(session) => {
            info!(user_id = %sender.user_id, "Starting onboarding");
            bot.send_message(
                msg.chat.id,
                t_args_lang("welcome", &[("name", &sender.name)], language_code),
            )
            .await?;
            begin_onboarding(bot, msg.chat.id, dialogue, session, language_code).await
        }
    }
}

/// Handle /cancel. Onboarding has no cancel path: the current question is repeated.
async fn handle_cancel_command(
    bot: &Bot,
    msg: &Message,
    dialogue: &BotDialogue,
    language_code: Option<&str>,
) -> Result<()> {
    match dialogue.get().await?.unwrap_or_default() {
        state if state.is_cancellable() => {
            cancel_input(bot, msg.chat.id, dialogue, language_code).await
        }
        BotDialogueState::Onboarding { session } => {
            send_onboarding_question(bot, msg.chat.id, session.step, language_code).await
        }
        _ => {
            bot.send_message(msg.chat.id, t_lang("main-menu", language_code))
                .await?;
            Ok(())
        }
    }
}

/// Load the profile for a menu or free-form message. Users without completed
/// parameters are sent back to the first onboarding question.
async fn load_onboarded_profile(
    bot: &Bot,
    msg: &Message,
    dialogue: &BotDialogue,
    ctx: &BotContext,
    sender: &Sender<'_>,
) -> Result<Option<UserProfile>> {
    let profile = match ctx.store.get_user(&sender.user_id).await? {
        Some(profile) => profile,
        None => ctx.store.upsert_user(&sender.user_id, &sender.name).await?,
    };

    if profile.is_onboarded() {
        return Ok(Some(profile));
    }

    info!(user_id = %sender.user_id, "No completed profile, restarting onboarding");
    begin_onboarding(
        bot,
        msg.chat.id,
        dialogue,
        OnboardingSession::new(),
        sender.language_code,
    )
    .await?;
    Ok(None)
}

/// Run a main menu action
async fn handle_menu_action(
    bot: &Bot,
    msg: &Message,
    dialogue: &BotDialogue,
    ctx: &BotContext,
    profile: &UserProfile,
    action: MenuAction,
    language_code: Option<&str>,
) -> Result<()> {
    let chat_id = msg.chat.id;
    debug!(user_id = %profile.user_id, action = ?action, "Menu action");

    match action {
        MenuAction::Profile => show_profile(bot, chat_id, profile, language_code).await,
        MenuAction::Kbju => show_kbju(bot, chat_id, dialogue, profile, language_code).await,
        MenuAction::ChangeGoal => {
            begin_goal_change(bot, chat_id, dialogue, profile, language_code).await
        }
        MenuAction::DiaryAdd => {
            begin_journal_entry(bot, chat_id, dialogue, JournalKind::Diary, language_code).await
        }
        MenuAction::DiaryShow => {
            show_journal(bot, chat_id, ctx, &profile.user_id, JournalKind::Diary, language_code)
                .await
        }
        MenuAction::ProgressAdd => {
            begin_journal_entry(bot, chat_id, dialogue, JournalKind::Progress, language_code).await
        }
        MenuAction::ProgressShow => {
            show_journal(bot, chat_id, ctx, &profile.user_id, JournalKind::Progress, language_code)
                .await
        }
        MenuAction::Help => {
            send_rich_text(bot, chat_id, &t_lang("help-text", language_code), None).await
        }
        MenuAction::Cancel => cancel_input(bot, chat_id, dialogue, language_code).await,
    }
}

async fn handle_text_message(
    bot: &Bot,
    msg: &Message,
    dialogue: &BotDialogue,
    ctx: &BotContext,
    raw_text: &str,
) -> Result<()> {
    let sender = match Sender::from_message(msg) {
        Some(sender) => sender,
        None => {
            debug!(chat_id = %msg.chat.id, "Ignoring message without sender");
            return Ok(());
        }
    };
    let language_code = sender.language_code;

    debug!(user_id = %sender.user_id, message_length = raw_text.len(), "Received text message from user");

    // Commands work in every state
    match parse_command(raw_text.trim()) {
        Some(BotCommand::Start) => return handle_start(bot, msg, dialogue, ctx, &sender).await,
        Some(BotCommand::Help) => {
            return send_rich_text(bot, msg.chat.id, &t_lang("help-text", language_code), None)
                .await
        }
        Some(BotCommand::Cancel) => {
            return handle_cancel_command(bot, msg, dialogue, language_code).await
        }
        None => {}
    }

    // Then the state waiting for input
    let state = dialogue.get().await?.unwrap_or_default();
    let text = state_input(&state, raw_text);

    match state {
        BotDialogueState::Onboarding { session } => {
            return handle_onboarding_input(
                bot,
                msg,
                dialogue,
                ctx,
                &sender.user_id,
                session,
                text,
                language_code,
            )
            .await;
        }
        BotDialogueState::WaitingForGoal => {
            return handle_goal_input(bot, msg, dialogue, ctx, &sender.user_id, text, language_code)
                .await;
        }
        BotDialogueState::WaitingForDiaryEntry => {
            return handle_journal_input(
                bot,
                msg,
                dialogue,
                ctx,
                &sender.user_id,
                JournalKind::Diary,
                text,
                language_code,
            )
            .await;
        }
        BotDialogueState::WaitingForProgressEntry => {
            return handle_journal_input(
                bot,
                msg,
                dialogue,
                ctx,
                &sender.user_id,
                JournalKind::Progress,
                text,
                language_code,
            )
            .await;
        }
        BotDialogueState::Start => {
            let Some(profile) = load_onboarded_profile(bot, msg, dialogue, ctx, &sender).await?
            else {
                return Ok(());
            };
            dialogue.update(BotDialogueState::MainMenu).await?;
            return route_main_menu(bot, msg, dialogue, ctx, profile, text, language_code).await;
        }
        BotDialogueState::MainMenu => {}
    }

    let Some(profile) = load_onboarded_profile(bot, msg, dialogue, ctx, &sender).await? else {
        return Ok(());
    };
    route_main_menu(bot, msg, dialogue, ctx, profile, text, language_code).await
}

/// Menu buttons first, anything else is a free-form question
async fn route_main_menu(
    bot: &Bot,
    msg: &Message,
    dialogue: &BotDialogue,
    ctx: &BotContext,
    profile: UserProfile,
    text: &str,
    language_code: Option<&str>,
) -> Result<()> {
    match resolve_menu_action(text) {
        Some(action) => {
            handle_menu_action(bot, msg, dialogue, ctx, &profile, action, language_code).await
        }
        None => handle_free_form_message(bot, msg.chat.id, ctx, profile, text, language_code).await,
    }
}

async fn handle_unsupported_message(bot: &Bot, msg: &Message) -> Result<()> {
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_deref());

    debug!(chat_id = %msg.chat.id, "Received unsupported message type from user");
    bot.send_message(msg.chat.id, t_lang("text-only", language_code))
        .await?;
    Ok(())
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    ctx: Arc<BotContext>,
    dialogue: BotDialogue,
) -> Result<()> {
    match msg.text() {
        Some(text) => handle_text_message(&bot, &msg, &dialogue, &ctx, text).await,
        None => handle_unsupported_message(&bot, &msg).await,
    }
}
