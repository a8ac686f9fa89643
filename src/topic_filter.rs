//! # Topic Filter Module
//!
//! Decides whether a free-form message is about fitness or nutrition before it
//! is forwarded to the model. Cheap deterministic stages run first, in a fixed
//! order, and the first stage that fires decides:
//!
//! 1. blacklist term → out of scope
//! 2. whitelist term → in scope
//! 3. health restriction cue → in scope
//! 4. domain keyword regex → in scope
//! 5. model yes/no question with recent history → in scope iff affirmative

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::errors::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmClient};
use crate::profile::{HistoryEntry, HistoryRole};
use crate::topic_patterns::{
    AFFIRMATIVE_TOKENS, BLACKLIST, DOMAIN_REGEX_SET, HEALTH_RESTRICTION_REGEX, WHITELIST,
};

const CLASSIFIER_PROMPT: &str = "You are a strict topic classifier for a fitness and nutrition assistant. \
Decide whether the user's latest message is related to fitness, training, sports, nutrition, food, \
body weight, health restrictions or a healthy lifestyle, taking the conversation so far into account. \
Answer with exactly one word: YES or NO.";

const CLASSIFIER_MAX_TOKENS: u32 = 3;

/// The cascade stage that produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicStage {
    Blacklist,
    Whitelist,
    HealthRestriction,
    DomainKeyword,
    ModelFallback,
}

impl fmt::Display for TopicStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TopicStage::Blacklist => "blacklist",
            TopicStage::Whitelist => "whitelist",
            TopicStage::HealthRestriction => "health_restriction",
            TopicStage::DomainKeyword => "domain_keyword",
            TopicStage::ModelFallback => "model_fallback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicVerdict {
    pub in_scope: bool,
    pub stage: TopicStage,
}

impl TopicVerdict {
    fn accept(stage: TopicStage) -> Self {
        Self { in_scope: true, stage }
    }

    fn reject(stage: TopicStage) -> Self {
        Self { in_scope: false, stage }
    }
}

/// Whether `term` occurs in `text` at the start of a word ("спорт" in
/// "спортзал" but not in "транспорт")
fn contains_term(text: &str, term: &str) -> bool {
    text.match_indices(term).any(|(idx, _)| {
        text[..idx]
            .chars()
            .next_back()
            .map_or(true, |prev| !prev.is_alphanumeric())
    })
}

/// Run stages 1-4. `None` means no heuristic fired and the model must decide.
pub fn heuristic_verdict(text: &str) -> Option<TopicVerdict> {
    let lower = text.to_lowercase();

    if BLACKLIST.iter().any(|term| contains_term(&lower, term)) {
        return Some(TopicVerdict::reject(TopicStage::Blacklist));
    }
    if WHITELIST.iter().any(|term| contains_term(&lower, term)) {
        return Some(TopicVerdict::accept(TopicStage::Whitelist));
    }
    if HEALTH_RESTRICTION_REGEX.is_match(&lower) {
        return Some(TopicVerdict::accept(TopicStage::HealthRestriction));
    }
    if DOMAIN_REGEX_SET.is_match(&lower) {
        return Some(TopicVerdict::accept(TopicStage::DomainKeyword));
    }
    None
}

/// Whether a classifier reply contains the affirmative token
pub fn is_affirmative(reply: &str) -> bool {
    let lower = reply.to_lowercase();
    AFFIRMATIVE_TOKENS.iter().any(|token| lower.contains(token))
}

/// Build the yes/no classification request with the given history as context
pub fn classification_request(text: &str, history: &[HistoryEntry]) -> CompletionRequest {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(CLASSIFIER_PROMPT));
    messages.extend(history.iter().map(|entry| match entry.role {
        HistoryRole::User => ChatMessage::user(entry.text.clone()),
        HistoryRole::Bot => ChatMessage::assistant(entry.text.clone()),
    }));
    messages.push(ChatMessage::user(format!(
        "Latest message: \"{text}\"\nIs it on topic? Answer YES or NO."
    )));

    CompletionRequest {
        messages,
        temperature: 0.0,
        max_tokens: CLASSIFIER_MAX_TOKENS,
    }
}

/// Topic relevance gate with a model fallback
#[derive(Clone)]
pub struct TopicFilter {
    llm: Arc<dyn LlmClient>,
    /// (user, bot) turn pairs shown to the classifier
    history_turns: usize,
}

impl TopicFilter {
    pub fn new(llm: Arc<dyn LlmClient>, history_turns: usize) -> Self {
        Self { llm, history_turns }
    }

    /// Classify `text`; `history` is the user's stored history, oldest first
    pub async fn classify(
        &self,
        text: &str,
        history: &[HistoryEntry],
    ) -> Result<TopicVerdict, LlmError> {
        if let Some(verdict) = heuristic_verdict(text) {
            debug!(stage = %verdict.stage, in_scope = verdict.in_scope, "Topic decided by heuristic");
            return Ok(verdict);
        }

        let entries = self.history_turns.saturating_mul(2);
        let start = history.len().saturating_sub(entries);
        let request = classification_request(text, &history[start..]);
        let reply = self.llm.complete(request).await?;
        let in_scope = is_affirmative(&reply);

        debug!(reply = %reply.trim(), in_scope, "Topic decided by model fallback");
        Ok(TopicVerdict {
            in_scope,
            stage: TopicStage::ModelFallback,
        })
    }
}
