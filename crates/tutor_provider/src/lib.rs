mod client;
mod error;
mod request;
mod response;

pub use client::{ChatCompletion, Client, ClientBuilder};
pub use error::Error;
pub use request::{
    ChatRequest, ContentPart, FunctionDefinition, ImageUrl, MessageContent, ResponseFormat,
    ToolChoice, ToolKind, WireMessage, WireRole, WireTool,
};
pub use response::{
    ChatResponse, Choice, CompletionMessage, ErrorBody, FunctionCall, ResponseMessage, Usage,
    WireToolCall,
};
