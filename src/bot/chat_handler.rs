//! Chat Handler module for free-form questions

use anyhow::{Context, Result};
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ParseMode, ReplyMarkup};
use teloxide::{ApiError, RequestError};
use tracing::{debug, error, info, warn};

use crate::advisor::compose_reply;
use crate::localization::t_lang;
use crate::profile::{push_turn, UserProfile};
use crate::text_format::{split_message, TELEGRAM_MESSAGE_LIMIT};

use super::context::BotContext;

/// Parse mode for bot replies. Legacy Markdown matches the `*bold*` produced
/// by `headings_to_bold` and needs no escaping of model output.
#[allow(deprecated)]
pub fn reply_parse_mode() -> ParseMode {
    ParseMode::Markdown
}

/// Send text with Telegram Markdown, resending it as plain text when the
/// markup is rejected
pub async fn send_rich_text(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    markup: Option<ReplyMarkup>,
) -> Result<()> {
    let mut request = bot
        .send_message(chat_id, text)
        .parse_mode(reply_parse_mode());
    if let Some(markup) = markup.clone() {
        request = request.reply_markup(markup);
    }

    match request.await {
        Ok(_) => Ok(()),
        Err(RequestError::Api(ApiError::CantParseEntities(reason))) => {
            warn!(chat_id = %chat_id, reason = %reason, "Markdown rejected, sending plain text");
            let mut plain = bot.send_message(chat_id, text);
            if let Some(markup) = markup {
                plain = plain.reply_markup(markup);
            }
            plain.await?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Answer a free-form message: relevance gate, model reply, chunked send,
/// history update
pub async fn handle_free_form_message(
    bot: &Bot,
    chat_id: ChatId,
    ctx: &BotContext,
    mut profile: UserProfile,
    text: &str,
    language_code: Option<&str>,
) -> Result<()> {
    let user_id = profile.user_id.clone();

    let verdict = match ctx.topic_filter.classify(text, &profile.history).await {
        Ok(verdict) => verdict,
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Topic classification failed");
            bot.send_message(chat_id, t_lang("llm-error", language_code))
                .await?;
            return Ok(());
        }
    };

    info!(
        user_id = %user_id,
        stage = %verdict.stage,
        in_scope = verdict.in_scope,
        "Topic relevance decided"
    );

    if !verdict.in_scope {
        bot.send_message(chat_id, t_lang("off-topic", language_code))
            .await?;
        return Ok(());
    }

    bot.send_chat_action(chat_id, ChatAction::Typing).await?;

    let reply = match compose_reply(ctx.llm.as_ref(), &profile, text, &ctx.settings).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Failed to compose reply");
            bot.send_message(chat_id, t_lang("llm-error", language_code))
                .await?;
            return Ok(());
        }
    };

    let chunks = split_message(&reply, TELEGRAM_MESSAGE_LIMIT);
    debug!(user_id = %user_id, chunks = chunks.len(), reply_chars = reply.chars().count(), "Sending reply");
    for chunk in &chunks {
        send_rich_text(bot, chat_id, chunk, None).await?;
    }

    push_turn(&mut profile.history, text, &reply, ctx.settings.history_window);
    ctx.store
        .save_history(&user_id, &profile.history)
        .await
        .context("Failed to store conversation history")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(deprecated)]
    fn test_replies_use_legacy_markdown() {
        assert_eq!(reply_parse_mode(), ParseMode::Markdown);
    }
}
