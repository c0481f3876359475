//! Conversation message model.

use serde::{Deserialize, Serialize};

use crate::ids::MessageId;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Typed by the user. Immutable once created.
    User,
    /// Produced by the backend. Replaced as stream events arrive.
    Ai,
}

impl Role {
    /// Short label for display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "you",
            Self::Ai => "ai",
        }
    }
}

/// A file change proposed by the backend, waiting for apply or discard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePreview {
    /// Full proposed file content.
    pub code: String,
    /// Target filename as reported by the backend.
    pub filename: String,
    /// The explanation that accompanied the proposal.
    pub explanation: String,
}

/// One entry in a conversation buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier.
    pub id: MessageId,
    /// Message body. Grows while streaming.
    pub text: String,
    /// Author of the message.
    #[serde(rename = "type")]
    pub role: Role,
    /// Whether this message is the placeholder receiving stream events.
    #[serde(default)]
    pub is_streaming: bool,
    /// Pending change proposal, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<ChangePreview>,
    /// Model that produced this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_model: Option<String>,
}

impl Message {
    /// Create a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            text: text.into(),
            role: Role::User,
            is_streaming: false,
            preview: None,
            agent_model: None,
        }
    }

    /// Create a finished AI message.
    #[must_use]
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            text: text.into(),
            role: Role::Ai,
            is_streaming: false,
            preview: None,
            agent_model: None,
        }
    }

    /// Create the empty AI placeholder that will receive a stream.
    #[must_use]
    pub fn streaming_placeholder(model: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            text: String::new(),
            role: Role::Ai,
            is_streaming: true,
            preview: None,
            agent_model: Some(model.into()),
        }
    }

    /// Check if this is a user message.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Kind of a user-supplied attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// Image, carried as a data URL.
    Image,
    /// Text file, carried verbatim.
    File,
}

/// Content the user attached to the next prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment identifier.
    pub id: MessageId,
    /// Attachment kind.
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    /// Display name, usually the file name.
    pub name: String,
    /// Text content or data URL.
    pub data: String,
}

impl Attachment {
    /// Create a text file attachment.
    #[must_use]
    pub fn file(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            kind: AttachmentKind::File,
            name: name.into(),
            data: data.into(),
        }
    }

    /// Create an image attachment from a data URL.
    #[must_use]
    pub fn image(name: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            kind: AttachmentKind::Image,
            name: name.into(),
            data: data_url.into(),
        }
    }
}

/// How the backend should treat a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Discuss and propose; changes go through preview.
    #[default]
    Planning,
    /// Carry out the task.
    Act,
}

impl Mode {
    /// Wire name of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "Planning",
            Self::Act => "Act",
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "planning" | "plan" => Ok(Self::Planning),
            "act" => Ok(Self::Act),
            _ => Err(crate::CoreError::UnknownMode(s.to_string())),
        }
    }
}
