//! # Advisor Module
//!
//! Builds the model prompt from the user's profile and history and turns the
//! completion into Telegram-ready text.

use crate::config::ChatSettings;
use crate::errors::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmClient};
use crate::profile::{HistoryRole, UserProfile};
use crate::text_format::headings_to_bold;

const ADVISOR_ROLE: &str = "You are a friendly personal fitness and nutrition coach in a Telegram chat. \
Give practical, safe, concise advice about training, nutrition and healthy weight management. \
Adapt every recommendation to the user's profile and health restrictions. \
Reply in the language of the user's message. Do not diagnose diseases; suggest seeing a doctor when symptoms are serious.";

/// System instruction with the stored profile parameters embedded
pub fn build_system_prompt(profile: &UserProfile) -> String {
    let mut prompt = String::from(ADVISOR_ROLE);
    prompt.push_str("\n\nUser profile:\n");

    match &profile.params {
        Some(params) => {
            prompt.push_str(&format!(
                "- Name: {}\n- Gender: {}\n- Weight: {}\n- Height: {}\n- Age: {}\n- Health restrictions: {}\n- Goal: {}\n- Activity factor: {}\n",
                profile.name,
                params.gender,
                params.weight,
                params.height,
                params.age,
                params.health,
                params.goal,
                params.activity_factor
            ));
        }
        None => {
            prompt.push_str(&format!(
                "- Name: {}\n- The profile questionnaire has not been completed.\n",
                profile.name
            ));
        }
    }

    prompt
}

/// System message, stored history (oldest first), then the new question
pub fn build_messages(profile: &UserProfile, user_text: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(profile.history.len() + 2);
    messages.push(ChatMessage::system(build_system_prompt(profile)));
    messages.extend(profile.history.iter().map(|entry| match entry.role {
        HistoryRole::User => ChatMessage::user(entry.text.clone()),
        HistoryRole::Bot => ChatMessage::assistant(entry.text.clone()),
    }));
    messages.push(ChatMessage::user(user_text));
    messages
}

/// Ask the model and reformat its answer for Telegram
pub async fn compose_reply(
    llm: &dyn LlmClient,
    profile: &UserProfile,
    user_text: &str,
    settings: &ChatSettings,
) -> Result<String, LlmError> {
    let request = CompletionRequest {
        messages: build_messages(profile, user_text),
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
    };

    let reply = llm.complete(request).await?;
    Ok(headings_to_bold(reply.trim()))
}
