use std::time::Duration;

use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use strum_macros::AsRefStr;
use thiserror::Error;

/// Errors produced by the expression evaluator
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// Input matched a denylisted pattern and was never parsed
    #[error("Expression contains disallowed content: {pattern}")]
    Disallowed {
        /// The denylist entry that matched
        pattern: String,
    },

    /// The grammar rejected the expression
    #[error("Failed to parse expression at position {position}: {reason}")]
    ParseFailure {
        /// Byte offset where parsing stopped
        position: usize,
        /// Description of the syntax issue
        reason: String,
    },

    /// The expression evaluated to NaN or Infinity
    #[error("Expression did not evaluate to a finite number")]
    NonFiniteResult,
}

/// Errors that abort a conversation turn
#[derive(Debug, Error)]
pub enum TurnError {
    /// Network or service failure from either model round
    #[error("Upstream model request failed: {0}")]
    UpstreamFailure(String),

    /// The model returned no usable content
    #[error("Model returned no usable content")]
    EmptyResponse,

    /// The model request exceeded the configured deadline
    #[error("Model request timed out after {0:?}")]
    Timeout(Duration),
}

/// User-visible failure categories surfaced by the turn pipeline
#[derive(AsRefStr, Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorCategory {
    Connection,
    Auth,
    RateLimit,
    Timeout,
    Unexpected,
}

impl ErrorCategory {
    /// Whether a retry with unchanged input is a sensible affordance.
    /// Credential misconfiguration is the only category a resubmit cannot
    /// fix.
    pub fn recoverable(&self) -> bool {
        !matches!(self, ErrorCategory::Auth)
    }
}

/// Categorized failure detail retained on the session for the retry
/// affordance
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Setters)]
#[setters(into)]
pub struct ErrorDetail {
    pub category: ErrorCategory,
    pub message: String,
    pub recoverable: bool,
}

impl ErrorDetail {
    pub fn new(category: ErrorCategory, message: impl ToString) -> Self {
        Self {
            category,
            message: message.to_string(),
            recoverable: category.recoverable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_auth_is_not_recoverable() {
        let actual = ErrorDetail::new(ErrorCategory::Auth, "invalid api key");
        assert_eq!(actual.recoverable, false);
    }

    #[test]
    fn test_rate_limit_is_recoverable() {
        let actual = ErrorDetail::new(ErrorCategory::RateLimit, "slow down");
        assert_eq!(actual.recoverable, true);
    }

    #[test]
    fn test_category_serializes_kebab_case() {
        let actual = serde_json::to_string(&ErrorCategory::RateLimit).unwrap();
        assert_eq!(actual, "\"rate-limit\"");
    }
}
