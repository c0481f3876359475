//! Conversation routing for stream events.
//!
//! A [`Route`] is fixed when a message is sent. Every event of that
//! generation goes to the origin conversation, whatever file is active by
//! the time the event arrives.

use aifactory_client::StreamEvent;
use aifactory_core::{reducer, ConversationKey, Message};

use crate::log::LogLevel;
use crate::workspace::Workspace;

/// Destination of one generation's events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    key: ConversationKey,
}

impl Route {
    /// Bind to the conversation of `origin` (`None` means global).
    #[must_use]
    pub fn from_origin(origin: Option<&str>) -> Self {
        Self {
            key: ConversationKey::for_path(origin),
        }
    }

    /// The bound conversation.
    #[must_use]
    pub const fn key(&self) -> &ConversationKey {
        &self.key
    }

    /// Apply an update to the bound conversation.
    ///
    /// Returns `false` if the conversation is gone.
    pub fn update(
        &self,
        workspace: &mut Workspace,
        update: impl FnOnce(Vec<Message>) -> Vec<Message>,
    ) -> bool {
        workspace.update_buffer(&self.key, update)
    }

    /// Apply one stream event to the bound conversation.
    pub fn dispatch(&self, workspace: &mut Workspace, event: StreamEvent) {
        let delivered = match event {
            StreamEvent::Chunk { content } => {
                self.update(workspace, |m| reducer::apply_chunk(m, &content))
            }
            StreamEvent::Preview {
                explanation,
                code,
                filename,
            } => {
                workspace.log(LogLevel::Warning, "Agent is asking for approval of changes");
                self.update(workspace, |m| {
                    reducer::apply_preview(m, &explanation, &code, &filename)
                })
            }
            StreamEvent::SecurityWarning { threats } => {
                workspace.log(
                    LogLevel::Error,
                    format!("Threats detected: {}", threats.join(", ")),
                );
                self.update(workspace, reducer::apply_security_warning)
            }
            // Other generations may still be streaming; `done` changes nothing.
            StreamEvent::Done | StreamEvent::Unknown => true,
        };

        if !delivered {
            tracing::debug!(conversation = %self.key, "Conversation closed; dropping event");
        }
    }
}
