use thiserror::Error;
use tutor_domain::{ErrorCategory, ErrorDetail, TurnError};

/// A failed turn: the protocol-level error plus the categorized,
/// user-visible detail the UI needs for its retry affordance
#[derive(Debug, Error)]
#[error("{error}")]
pub struct TurnFailure {
    pub error: TurnError,
    pub detail: ErrorDetail,
}

impl TurnFailure {
    /// A failure from either model round, categorized by its transport
    /// cause before the provider error is flattened into a message
    pub fn upstream(error: tutor_provider::Error) -> Self {
        let category = error.category();
        let message = error.to_string();
        let error = match error {
            tutor_provider::Error::Timeout(duration) => TurnError::Timeout(duration),
            _ => TurnError::UpstreamFailure(message.clone()),
        };
        Self { error, detail: ErrorDetail::new(category, message) }
    }

    pub fn empty_response() -> Self {
        Self {
            error: TurnError::EmptyResponse,
            detail: ErrorDetail::new(ErrorCategory::Unexpected, "Model returned no usable content"),
        }
    }

    /// A local pipeline failure (e.g. template rendering), surfaced in the
    /// catch-all category
    pub fn internal(error: anyhow::Error) -> Self {
        Self {
            error: TurnError::UpstreamFailure(error.to_string()),
            detail: ErrorDetail::new(ErrorCategory::Unexpected, error.to_string()),
        }
    }
}
