use derive_setters::Setters;
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name of a tool capability declared to the model
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ToolName(String);

impl ToolName {
    pub fn new(value: impl ToString) -> Self {
        ToolName(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A tool capability declared to the model on the first protocol round
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Setters)]
#[setters(into, strip_option)]
pub struct ToolDefinition {
    pub name: ToolName,
    pub description: String,
    pub input_schema: RootSchema,
}

/// Input accepted by the `calculate` tool. Doubles as the schema source and
/// the argument parser for incoming tool calls.
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq, Serialize)]
pub struct CalculateInput {
    /// The mathematical expression to evaluate (e.g., '3 + 7', '2 * (4 + 5)',
    /// 'sqrt(16)')
    pub expression: String,
}

/// Name under which the calculator is declared in the model contract
pub const CALCULATOR_TOOL_NAME: &str = "calculate";

/// The calculator tool declaration sent on round 1
pub fn calculator() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::new(CALCULATOR_TOOL_NAME),
        description: concat!(
            "Safely evaluate a mathematical expression to verify arithmetic. ",
            "Use this to check if a student's calculation is correct before ",
            "providing feedback. Supports basic arithmetic: +, -, *, /, ",
            "parentheses, exponents (^ or **), and common functions like sqrt()."
        )
        .to_string(),
        input_schema: schemars::schema_for!(CalculateInput),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_calculator_name() {
        let actual = calculator();
        assert_eq!(actual.name, ToolName::new("calculate"));
    }

    #[test]
    fn test_calculator_schema_requires_expression() {
        let schema = serde_json::to_value(calculator().input_schema).unwrap();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required, &vec![serde_json::json!("expression")]);
    }

    #[test]
    fn test_calculate_input_parses_model_arguments() {
        let actual: CalculateInput = serde_json::from_str(r#"{"expression": "3 + 7"}"#).unwrap();
        let expected = CalculateInput { expression: "3 + 7".to_string() };
        assert_eq!(actual, expected);
    }
}
