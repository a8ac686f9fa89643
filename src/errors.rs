//! # Error Types Module
//!
//! Typed errors for the model client and the KBJU calculator. Handlers and
//! storage code use `anyhow` and attach context instead.

use thiserror::Error;

/// Errors returned by language-model calls
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport-level failure (connect, timeout, body decoding)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The API answered with a non-success status
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    /// The API answered without any completion choice
    #[error("Empty response from model")]
    EmptyResponse,
    /// Too many recent failures, calls are short-circuited
    #[error("Circuit breaker open: {0}")]
    CircuitOpen(String),
}

impl LlmError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(_) | LlmError::EmptyResponse => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::CircuitOpen(_) => false,
        }
    }
}

/// Errors raised when profile fields cannot feed the KBJU calculator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    /// A numeric field does not contain a number
    #[error("Invalid value for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    /// A numeric field is zero or negative
    #[error("Value for {field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    /// The gender answer is not recognised
    #[error("Unrecognised gender: {0:?}")]
    UnknownGender(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_formatting() {
        let err = NutritionError::InvalidNumber {
            field: "weight",
            value: "heavy".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for weight: \"heavy\"");

        let err = LlmError::Api {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "API error 503: overloaded");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(LlmError::Api { status: 429, body: String::new() }.is_retryable());
        assert!(LlmError::Api { status: 500, body: String::new() }.is_retryable());
        assert!(!LlmError::Api { status: 401, body: String::new() }.is_retryable());
        assert!(!LlmError::CircuitOpen("open".to_string()).is_retryable());
        assert!(LlmError::EmptyResponse.is_retryable());
    }
}
