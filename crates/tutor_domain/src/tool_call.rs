use serde::{Deserialize, Serialize};

/// Unique identifier for a single tool invocation, assigned by the model.
/// Results must be correlated back through this id; result order is not
/// significant.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ToolCallId(pub(crate) String);

impl ToolCallId {
    pub fn new(value: impl ToString) -> Self {
        ToolCallId(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A calculation requested by the model mid-turn. Transient: it exists only
/// within a single turn's lifecycle and is never persisted.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ToolCallRequest {
    pub id: ToolCallId,
    pub expression: String,
}

impl ToolCallRequest {
    pub fn new(id: impl ToString, expression: impl ToString) -> Self {
        Self {
            id: ToolCallId::new(id),
            expression: expression.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_call_id_is_transparent() {
        let actual = serde_json::to_string(&ToolCallId::new("call_1")).unwrap();
        assert_eq!(actual, "\"call_1\"");
    }
}
