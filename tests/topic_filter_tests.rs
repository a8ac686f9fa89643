//! # Topic Filter Tests
//!
//! Runs the relevance cascade against a scripted model client that counts
//! how often the fallback is consulted.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fitbot::errors::LlmError;
use fitbot::llm::{CompletionRequest, LlmClient};
use fitbot::profile::HistoryEntry;
use fitbot::topic_filter::{heuristic_verdict, TopicFilter, TopicStage};

struct ScriptedLlm {
    reply: String,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl ScriptedLlm {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        Ok(self.reply.clone())
    }
}

struct FailingLlm;

#[async_trait]
impl LlmClient for FailingLlm {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, LlmError> {
        Err(LlmError::EmptyResponse)
    }
}

#[tokio::test]
async fn test_domain_keywords_never_call_model() -> Result<()> {
    let llm = ScriptedLlm::new("NO");
    let filter = TopicFilter::new(llm.clone(), 5);

    let messages = [
        "Как составить программу тренировок на массу?",
        "How much protein should I eat after a workout?",
        "Сколько калорий в гречке?",
        "Is it ok to eat chocolate sometimes?",
        "Посоветуй упражнения на пресс",
    ];

    for message in messages {
        let verdict = filter.classify(message, &[]).await?;
        assert!(verdict.in_scope, "{message} should be in scope");
    }

    assert_eq!(llm.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_blacklist_wins_over_whitelist() -> Result<()> {
    let llm = ScriptedLlm::new("YES");
    let filter = TopicFilter::new(llm.clone(), 5);

    let verdict = filter
        .classify("Hello! What do you think about bitcoin?", &[])
        .await?;
    assert!(!verdict.in_scope);
    assert_eq!(verdict.stage, TopicStage::Blacklist);

    let verdict = filter.classify("Фитнес и политика", &[]).await?;
    assert!(!verdict.in_scope);
    assert_eq!(llm.calls(), 0);
    Ok(())
}

/// Words that merely contain a cue ("больше", "жираф", "транспорт") are left
/// to the model
#[test]
fn test_lookalike_words_are_not_cues() {
    let messages = [
        "Какая страна больше, Россия или Канада?",
        "Сколько живёт жираф?",
        "Что такое атмосферное давление?",
        "Где ближайшая больница?",
        "Как работает общественный транспорт?",
    ];

    for message in messages {
        assert_eq!(heuristic_verdict(message), None, "{message} should reach the model");
    }
}

#[test]
fn test_anchored_cues_still_match() {
    let cases = [
        ("У меня болит колено", TopicStage::HealthRestriction),
        ("Высокое давление, можно ли бегать?", TopicStage::HealthRestriction),
        ("Как убрать жир с живота?", TopicStage::DomainKeyword),
        ("Люблю спорт", TopicStage::Whitelist),
    ];

    for (message, stage) in cases {
        let verdict = heuristic_verdict(message).unwrap();
        assert!(verdict.in_scope);
        assert_eq!(verdict.stage, stage, "{message}");
    }
}

#[tokio::test]
async fn test_model_fallback_uses_recent_history() -> Result<()> {
    let llm = ScriptedLlm::new("Yes");
    let filter = TopicFilter::new(llm.clone(), 1);

    let history = vec![
        HistoryEntry::user("first"),
        HistoryEntry::bot("first answer"),
        HistoryEntry::user("second"),
        HistoryEntry::bot("second answer"),
    ];

    let verdict = filter.classify("And what about tomorrow?", &history).await?;
    assert!(verdict.in_scope);
    assert_eq!(verdict.stage, TopicStage::ModelFallback);
    assert_eq!(llm.calls(), 1);

    let request = llm.last_request.lock().unwrap().clone().unwrap();
    // system prompt + the last turn pair + the question
    assert_eq!(request.messages.len(), 4);
    assert_eq!(request.messages[1].content, "second");
    Ok(())
}

#[tokio::test]
async fn test_model_negative_rejects() -> Result<()> {
    let llm = ScriptedLlm::new("NO");
    let filter = TopicFilter::new(llm.clone(), 5);

    let verdict = filter.classify("What is the capital of Peru?", &[]).await?;
    assert!(!verdict.in_scope);
    assert_eq!(llm.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_model_error_propagates() {
    let filter = TopicFilter::new(Arc::new(FailingLlm), 5);
    let result = filter.classify("What is the capital of Peru?", &[]).await;
    assert!(matches!(result, Err(LlmError::EmptyResponse)));
}
