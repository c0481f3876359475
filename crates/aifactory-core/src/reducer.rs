//! Functional updates applied to a conversation buffer.
//!
//! Every reducer takes the buffer by value and returns the replacement. Stream
//! reducers only touch the message flagged `is_streaming`; review reducers
//! only touch the message with the given id. Everything else passes through
//! unchanged and in order.

use crate::ids::MessageId;
use crate::message::{ChangePreview, Message};

/// Suffix appended to a message blocked by the backend's security scan.
pub const SECURITY_WARNING_SUFFIX: &str =
    "\n\n🚨 **SECURITY WARNING**: Blocked due to detected threats.";

/// Text shown on a message once its preview was discarded.
pub const DISCARDED_TEXT: &str = "❌ Changes discarded.";

fn map_streaming(mut messages: Vec<Message>, f: impl FnOnce(&mut Message)) -> Vec<Message> {
    if let Some(m) = messages.iter_mut().find(|m| m.is_streaming) {
        f(m);
    }
    messages
}

/// Append streamed text to the streaming message.
#[must_use]
pub fn apply_chunk(messages: Vec<Message>, content: &str) -> Vec<Message> {
    map_streaming(messages, |m| m.text.push_str(content))
}

/// Replace the streaming message with a change proposal and end its stream.
#[must_use]
pub fn apply_preview(
    messages: Vec<Message>,
    explanation: &str,
    code: &str,
    filename: &str,
) -> Vec<Message> {
    map_streaming(messages, |m| {
        m.text = explanation.to_string();
        m.preview = Some(ChangePreview {
            code: code.to_string(),
            filename: filename.to_string(),
            explanation: explanation.to_string(),
        });
        m.is_streaming = false;
    })
}

/// Mark the streaming message as blocked and end its stream.
#[must_use]
pub fn apply_security_warning(messages: Vec<Message>) -> Vec<Message> {
    map_streaming(messages, |m| {
        m.text.push_str(SECURITY_WARNING_SUFFIX);
        m.is_streaming = false;
    })
}

/// Clear the streaming flag on every message.
#[must_use]
pub fn finalize(messages: Vec<Message>) -> Vec<Message> {
    messages
        .into_iter()
        .map(|mut m| {
            m.is_streaming = false;
            m
        })
        .collect()
}

fn map_by_id(
    messages: Vec<Message>,
    id: MessageId,
    f: impl Fn(Message) -> Message,
) -> Vec<Message> {
    messages
        .into_iter()
        .map(|m| if m.id == id { f(m) } else { m })
        .collect()
}

/// Record that the preview on `id` was applied to `filename`.
#[must_use]
pub fn mark_applied(messages: Vec<Message>, id: MessageId, filename: &str) -> Vec<Message> {
    map_by_id(messages, id, |mut m| {
        m.text = format!("✅ Changes approved and applied to {filename}.");
        m.preview = None;
        m
    })
}

/// Record that the preview on `id` was discarded.
#[must_use]
pub fn mark_discarded(messages: Vec<Message>, id: MessageId) -> Vec<Message> {
    map_by_id(messages, id, |mut m| {
        m.text = DISCARDED_TEXT.to_string();
        m.preview = None;
        m
    })
}

/// The message currently receiving stream events, if any.
#[must_use]
pub fn streaming_message(messages: &[Message]) -> Option<&Message> {
    messages.iter().find(|m| m.is_streaming)
}
