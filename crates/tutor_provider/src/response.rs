use serde::{Deserialize, Serialize};
use tracing::debug;
use tutor_domain::{CalculateInput, ToolCallRequest, CALCULATOR_TOOL_NAME};

use crate::Error;

/// Response body from the `chat/completions` endpoint. Providers embed
/// errors either as a non-success status or as an `error` object on a
/// success status; both shapes are handled.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

/// A tool invocation as the model emits it: arguments arrive as a JSON
/// string, not an object
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

/// The single assistant message extracted from a response, with calculator
/// invocations decoded
#[derive(Clone, Debug, Default)]
pub struct CompletionMessage {
    pub content: Option<String>,
    pub tool_calls: Vec<WireToolCall>,
}

impl CompletionMessage {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Trimmed content, if any arrived and is non-empty
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Decode each wire call into a calculation request. Calls that are not
    /// the calculator, or whose arguments do not parse, are returned in the
    /// error list so the caller can answer them with a failure result and
    /// keep id correlation complete.
    pub fn calculation_requests(&self) -> (Vec<ToolCallRequest>, Vec<(String, String)>) {
        let mut requests = Vec::new();
        let mut failures = Vec::new();

        for call in &self.tool_calls {
            if call.function.name != CALCULATOR_TOOL_NAME {
                debug!(name = %call.function.name, "Model requested an undeclared tool");
                failures.push((
                    call.id.clone(),
                    format!("unknown tool '{}'", call.function.name),
                ));
                continue;
            }

            match serde_json::from_str::<CalculateInput>(&call.function.arguments) {
                Ok(input) => requests.push(ToolCallRequest::new(&call.id, input.expression)),
                Err(error) => {
                    debug!(arguments = %call.function.arguments, %error, "Malformed tool arguments");
                    failures.push((call.id.clone(), format!("invalid arguments: {error}")));
                }
            }
        }

        (requests, failures)
    }
}

impl TryFrom<ChatResponse> for CompletionMessage {
    type Error = Error;

    fn try_from(response: ChatResponse) -> Result<Self, Self::Error> {
        if let Some(error) = response.error {
            return Err(Error::Upstream { message: error.message });
        }

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .unwrap_or_default();

        Ok(CompletionMessage {
            content: message.content,
            tool_calls: message.tool_calls.unwrap_or_default(),
        })
    }
}
