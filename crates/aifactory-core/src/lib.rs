//! Core types for the AI Factory client.
//!
//! This crate holds the pieces that do not talk to the network:
//!
//! - **Identifiers**: `MessageId` and `RequestId`
//! - **Paths**: separator- and case-insensitive file identity, conversation keys
//! - **Messages**: the conversation model (messages, previews, attachments)
//! - **Reducer**: functional updates applied as stream events arrive
//!
//! # Example
//!
//! ```
//! use aifactory_core::{reducer, Message};
//!
//! let buffer = vec![Message::user("hi"), Message::streaming_placeholder("gpt-4o")];
//! let buffer = reducer::apply_chunk(buffer, "Hello");
//! let buffer = reducer::finalize(buffer);
//!
//! assert_eq!(buffer[1].text, "Hello");
//! assert!(!buffer[1].is_streaming);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod message;
pub mod path;
pub mod reducer;

pub use error::{CoreError, Result};
pub use ids::{IdError, MessageId, RequestId};
pub use message::{Attachment, AttachmentKind, ChangePreview, Message, Mode, Role};
pub use path::{ConversationKey, NormalizedPath};
