use derive_more::derive::From;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tutor_domain::{
    ConversationMessage, MaxTokens, Role, Temperature, ToolDefinition, ToolResult,
};

use super::WireToolCall;

/// Request body for the OpenAI-compatible `chat/completions` endpoint
#[derive(Clone, Debug, Deserialize, Serialize, Setters)]
#[setters(into, strip_option)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Temperature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<MaxTokens>,
}

impl ChatRequest {
    pub fn new(model: impl ToString) -> Self {
        Self {
            model: model.to_string(),
            messages: Vec::new(),
            tools: None,
            tool_choice: None,
            response_format: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn add_message(mut self, message: WireMessage) -> Self {
        self.messages.push(message);
        self
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    System,
    User,
    Assistant,
    Tool,
}

impl From<Role> for WireRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => WireRole::User,
            Role::Assistant => WireRole::Assistant,
        }
    }
}

/// A message in the wire format. Assistant tool-call echoes and tool
/// results carry extra fields the plain history entries never use.
#[derive(Clone, Debug, Deserialize, Serialize, Setters)]
#[setters(into, strip_option)]
pub struct WireMessage {
    pub role: WireRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl WireMessage {
    pub fn system(content: impl ToString) -> Self {
        Self {
            role: WireRole::System,
            content: Some(MessageContent::Text(content.to_string())),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: WireRole::User,
            content: Some(MessageContent::Parts(parts)),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// The assistant turn that requested tool calls, echoed back verbatim
    /// on the second protocol round
    pub fn assistant_tool_calls(content: Option<String>, calls: Vec<WireToolCall>) -> Self {
        Self {
            role: WireRole::Assistant,
            content: content.map(MessageContent::Text),
            tool_calls: Some(calls),
            tool_call_id: None,
        }
    }

    /// A calculator outcome correlated to its originating call
    pub fn tool_result(result: &ToolResult) -> Self {
        Self {
            role: WireRole::Tool,
            content: Some(MessageContent::Text(result.to_content())),
            tool_calls: None,
            tool_call_id: Some(result.id.as_str().to_string()),
        }
    }
}

impl From<&ConversationMessage> for WireMessage {
    fn from(message: &ConversationMessage) -> Self {
        Self {
            role: message.role.into(),
            content: Some(MessageContent::Text(message.content.clone())),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, From, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Multimodal content part; the image variant carries a data URL for the
/// vision path
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl ToString) -> Self {
        ContentPart::Text { text: text.to_string() }
    }

    pub fn image_url(url: impl ToString) -> Self {
        ContentPart::ImageUrl { image_url: ImageUrl { url: url.to_string() } }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Function-tool declaration in the wire format
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WireTool {
    #[serde(rename = "type")]
    pub kind: ToolKind,
    pub function: FunctionDefinition,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Function,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl From<&ToolDefinition> for WireTool {
    fn from(definition: &ToolDefinition) -> Self {
        Self {
            kind: ToolKind::Function,
            function: FunctionDefinition {
                name: definition.name.as_str().to_string(),
                description: definition.description.clone(),
                parameters: serde_json::to_value(&definition.input_schema)
                    .unwrap_or_else(|_| serde_json::json!({})),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    Auto,
    None,
    Required,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonObject,
    Text,
}
