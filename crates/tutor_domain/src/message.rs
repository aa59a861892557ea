use derive_more::derive::Display;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// Role of a conversation participant. The system prompt is not part of the
/// history; it is attached per-request by the prompt builder.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[display("user")]
    User,
    #[display("assistant")]
    Assistant,
}

/// A single turn entry in the session history. Ordered by insertion;
/// immutable once appended.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, Setters)]
#[setters(into)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl ToString) -> Self {
        Self { role: Role::User, content: content.to_string() }
    }

    pub fn assistant(content: impl ToString) -> Self {
        Self { role: Role::Assistant, content: content.to_string() }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}
