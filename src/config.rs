//! # Configuration Module
//!
//! This module defines configuration structures for the bot, including model
//! call settings, retry behaviour and conversation history limits. Values are
//! read from the environment (after `.env` is loaded) with defaults below.

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

use crate::profile::DEFAULT_HISTORY_WINDOW;

// Constants for default configuration
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1500;
pub const DEFAULT_CLASSIFIER_HISTORY_TURNS: usize = 5;
pub const DEFAULT_JOURNAL_LIMIT: i64 = 5;

/// Retry and circuit breaker configuration for model calls
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Timeout for a single model request in seconds
    pub request_timeout_secs: u64,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// Circuit breaker reset timeout in seconds
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_retry_delay_ms: 500,
            max_retry_delay_ms: 5000,
            request_timeout_secs: 60,
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

/// Model connection settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub retry: RetryConfig,
}

/// Conversation settings used when composing replies and classifying topics
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Number of history entries kept per user
    pub history_window: usize,
    /// Number of (user, bot) turn pairs given to the topic classifier, so
    /// twice as many history entries
    pub classifier_history_turns: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Number of diary/progress entries shown in listings
    pub journal_limit: i64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            classifier_history_turns: DEFAULT_CLASSIFIER_HISTORY_TURNS,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            journal_limit: DEFAULT_JOURNAL_LIMIT,
        }
    }
}

/// Complete bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    /// Postgres connection string; the in-memory store is used when absent
    pub database_url: Option<String>,
    pub llm: LlmConfig,
    pub chat: ChatSettings,
}

impl BotConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .with_context(|| format!("{key} must be set"))
        };

        let defaults = ChatSettings::default();
        let chat = ChatSettings {
            history_window: parse_or(&lookup, "HISTORY_WINDOW", defaults.history_window)?,
            classifier_history_turns: parse_or(
                &lookup,
                "CLASSIFIER_HISTORY_TURNS",
                defaults.classifier_history_turns,
            )?,
            temperature: parse_or(&lookup, "LLM_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_or(&lookup, "LLM_MAX_TOKENS", defaults.max_tokens)?,
            journal_limit: parse_or(&lookup, "JOURNAL_LIMIT", defaults.journal_limit)?,
        };

        let config = Self {
            telegram_token: required("TELEGRAM_BOT_TOKEN")?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            llm: LlmConfig {
                api_key: required("OPENAI_API_KEY")?,
                model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                base_url: lookup("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                retry: RetryConfig::default(),
            },
            chat,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.chat.history_window < 2 {
            anyhow::bail!("HISTORY_WINDOW must hold at least one turn pair (>= 2)");
        }
        if !(0.0..=2.0).contains(&self.chat.temperature) {
            anyhow::bail!("LLM_TEMPERATURE must be between 0.0 and 2.0");
        }
        if self.chat.max_tokens == 0 {
            anyhow::bail!("LLM_MAX_TOKENS must be positive");
        }
        if self.chat.journal_limit <= 0 {
            anyhow::bail!("JOURNAL_LIMIT must be positive");
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {key}: {raw:?} ({e})")),
        None => Ok(default),
    }
}
