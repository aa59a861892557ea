use serde::{Deserialize, Serialize};

use crate::{EvalError, ToolCallId, ToolCallRequest};

/// Outcome of one calculator invocation, correlated to its originating
/// request by `id`. Serializes to the payload fed back to the model
/// (`success`/`result`/`error`/`expression`); the id travels separately as
/// the wire-level `tool_call_id`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ToolResult {
    #[serde(skip)]
    pub id: ToolCallId,
    pub success: bool,
    pub result: Option<f64>,
    pub error: Option<String>,
    pub expression: String,
}

impl ToolResult {
    pub fn new(id: ToolCallId, expression: impl ToString) -> Self {
        Self {
            id,
            success: false,
            result: None,
            error: None,
            expression: expression.to_string(),
        }
    }

    pub fn success(mut self, value: f64) -> Self {
        self.success = true;
        self.result = Some(value);
        self.error = None;
        self
    }

    pub fn failure(mut self, error: impl ToString) -> Self {
        self.success = false;
        self.result = None;
        self.error = Some(error.to_string());
        self
    }

    /// Fold an evaluator outcome into a correlated result. Evaluator errors
    /// are recovered here: they become structured data for the model, never
    /// turn failures.
    pub fn from_eval(request: &ToolCallRequest, outcome: Result<f64, EvalError>) -> Self {
        let result = Self::new(request.id.clone(), &request.expression);
        match outcome {
            Ok(value) => result.success(value),
            Err(error) => result.failure(error),
        }
    }

    /// The JSON payload carried in the tool message content.
    pub fn to_content(&self) -> String {
        // Serialization of this shape cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
