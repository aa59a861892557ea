mod contract;
mod error;
pub mod eval;
mod max_tokens;
mod message;
mod session;
mod temperature;
mod tool_call;
mod tool_definition;
mod tool_result;

pub use contract::{TurnMetadata, TutorTurnResponse};
pub use error::{ErrorCategory, ErrorDetail, EvalError, TurnError};
pub use max_tokens::MaxTokens;
pub use message::{ConversationMessage, Role};
pub use session::{HintTier, SessionConfig, SessionState, GREETING};
pub use temperature::Temperature;
pub use tool_call::{ToolCallId, ToolCallRequest};
pub use tool_definition::{calculator, CalculateInput, ToolDefinition, ToolName, CALCULATOR_TOOL_NAME};
pub use tool_result::ToolResult;
