use serde::{Deserialize, Serialize};

/// Completion-length bound for a single model call. Every call the tutor
/// makes is bounded; there is no unbounded generation path.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MaxTokens(u32);

impl Default for MaxTokens {
    /// Bound used for tutor replies
    fn default() -> Self {
        Self(600)
    }
}

impl MaxTokens {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for MaxTokens {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
