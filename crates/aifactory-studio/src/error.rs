//! Error types for the studio.

use aifactory_client::ClientError;
use aifactory_core::{ConversationKey, MessageId};
use thiserror::Error;

/// A result type using `StudioError`.
pub type Result<T> = std::result::Result<T, StudioError>;

/// Errors that can occur in studio operations.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Nothing to send: the prompt is blank and there are no attachments.
    #[error("nothing to send: prompt is empty and no attachments are pending")]
    EmptyPrompt,

    /// A generation for this conversation is still running.
    #[error("a generation is already streaming into the {0} conversation")]
    AlreadyStreaming(ConversationKey),

    /// The message does not exist in the conversation.
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),

    /// The message has no change waiting for review.
    #[error("message {0} has no pending change")]
    NoPendingPreview(MessageId),

    /// The backend refused to apply a change.
    #[error("backend did not apply changes to {0}")]
    ApplyRejected(String),

    /// The operation needs an active file.
    #[error("no active file")]
    NoActiveFile,

    /// The file is not open.
    #[error("file is not open: {0}")]
    FileNotOpen(String),

    /// A command line could not be understood.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Backend request failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The system clipboard could not be used.
    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
