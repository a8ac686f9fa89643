//! # LLM Client Module
//!
//! Chat-completion client abstraction. [`LlmClient`] is the seam used by the
//! topic filter and the advisor; [`OpenAiClient`] talks to any
//! OpenAI-compatible `/chat/completions` endpoint over reqwest.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::{LlmConfig, RetryConfig};
use crate::errors::LlmError;

/// Role of a chat message in a completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// A single completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Language-model interface: role-tagged messages in, reply text out
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Masks an API key for safe logging: first 7 chars + "***" + last 4 chars.
/// Keys of 11 chars or fewer are fully masked.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}***{tail}")
}

/// Delay before retry `attempt` (1-based): exponential backoff capped at the
/// configured maximum, plus up to 25% random jitter
pub fn retry_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exponential = config
        .base_retry_delay_ms
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(16));
    let capped = exponential.min(config.max_retry_delay_ms);
    let jitter = rand::thread_rng().gen_range(0..=capped / 4);
    Duration::from_millis(capped + jitter)
}

fn first_choice_content(response: ApiResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(LlmError::EmptyResponse)
}

/// OpenAI-compatible chat-completion client
pub struct OpenAiClient {
    http: reqwest::Client,
    config: LlmConfig,
    circuit_breaker: CircuitBreaker,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.retry.request_timeout_secs))
            .build()?;
        let circuit_breaker = CircuitBreaker::new(&config.retry);

        info!(
            model = %config.model,
            base_url = %config.base_url,
            api_key = %mask_token(&config.api_key),
            "Model client initialized"
        );

        Ok(Self {
            http,
            config,
            circuit_breaker,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = ApiRequest {
            model: &self.config.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ApiResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model usage"
            );
        }
        first_choice_content(parsed)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        if self.circuit_breaker.is_open() {
            warn!("Model circuit breaker is open, skipping request");
            return Err(LlmError::CircuitOpen(format!(
                "{} consecutive failures",
                self.circuit_breaker.failure_count()
            )));
        }

        debug!(
            message_count = request.messages.len(),
            max_tokens = request.max_tokens,
            "Sending completion request"
        );

        let mut attempt = 0;
        loop {
            match self.send_once(&request).await {
                Ok(reply) => {
                    self.circuit_breaker.record_success();
                    return Ok(reply);
                }
                Err(e) => {
                    self.circuit_breaker.record_failure();
                    if !e.is_retryable() || attempt >= self.config.retry.max_retries {
                        return Err(e);
                    }
                    attempt += 1;
                    let delay = retry_delay(&self.config.retry, attempt);
                    warn!(error = %e, attempt, delay_ms = delay.as_millis() as u64, "Model request failed, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token("sk-abcdefghijklmnop1234"), "sk-abcd***1234");
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let body = ApiRequest {
            model: "m",
            messages: &messages,
            temperature: 0.0,
            max_tokens: 3,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 3);
    }

    #[test]
    fn test_first_choice_content() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"YES"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_content(response).unwrap(), "YES");

        let empty: ApiResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_choice_content(empty), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn test_retry_delay_bounds() {
        let config = RetryConfig {
            base_retry_delay_ms: 100,
            max_retry_delay_ms: 1000,
            ..Default::default()
        };
        for attempt in 1..10 {
            let delay = retry_delay(&config, attempt).as_millis() as u64;
            assert!(delay >= 100.min(1000));
            assert!(delay <= 1000 + 250);
        }
    }
}
