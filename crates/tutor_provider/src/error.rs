use std::time::Duration;

use thiserror::Error;
use tutor_domain::ErrorCategory;

#[derive(Debug, Error)]
pub enum Error {
    /// Upstream returned a non-success HTTP status
    #[error("Invalid status code: {status}: {body}")]
    InvalidStatusCode { status: u16, body: String },

    /// Upstream returned a success status but an error payload
    #[error("Upstream error: {message}")]
    Upstream { message: String },

    /// Transport-level failure (DNS, TLS, connection reset, decode)
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured deadline elapsed before a response arrived
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The request URL could not be constructed from the configured base
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Map a provider failure onto the user-visible error taxonomy
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidStatusCode { status: 401 | 403, .. } => ErrorCategory::Auth,
            Error::InvalidStatusCode { status: 429, .. } => ErrorCategory::RateLimit,
            Error::InvalidStatusCode { status: 408 | 504, .. } => ErrorCategory::Timeout,
            Error::InvalidStatusCode { .. } => ErrorCategory::Unexpected,
            Error::Upstream { .. } => ErrorCategory::Unexpected,
            Error::Transport(error) if error.is_timeout() => ErrorCategory::Timeout,
            Error::Transport(error) if error.is_connect() => ErrorCategory::Connection,
            Error::Transport(_) => ErrorCategory::Connection,
            Error::Timeout(_) => ErrorCategory::Timeout,
            Error::InvalidUrl(_) => ErrorCategory::Unexpected,
        }
    }
}
