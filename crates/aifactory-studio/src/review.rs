//! Applying or discarding proposed changes.

use std::sync::Arc;

use aifactory_client::ApiClient;
use aifactory_core::{reducer, ChangePreview, ConversationKey, MessageId};

use crate::error::{Result, StudioError};
use crate::log::LogLevel;
use crate::status::StatusRefresh;
use crate::workspace::SharedWorkspace;

/// Resolves change previews by calling the backend.
#[derive(Clone)]
pub struct ChangeReview {
    client: ApiClient,
    workspace: SharedWorkspace,
    refresher: Arc<dyn StatusRefresh>,
}

impl ChangeReview {
    /// Create a reviewer.
    #[must_use]
    pub fn new(
        client: ApiClient,
        workspace: SharedWorkspace,
        refresher: Arc<dyn StatusRefresh>,
    ) -> Self {
        Self {
            client,
            workspace,
            refresher,
        }
    }

    fn pending_preview(&self, key: &ConversationKey, id: MessageId) -> Result<ChangePreview> {
        let ws = self.workspace.lock();
        let message = ws
            .buffer(key)
            .and_then(|messages| messages.iter().find(|m| m.id == id))
            .ok_or(StudioError::MessageNotFound(id))?;
        message
            .preview
            .clone()
            .ok_or(StudioError::NoPendingPreview(id))
    }

    /// Write a previewed change through the backend.
    ///
    /// On success the message is marked applied, the matching open file takes
    /// the new content and loses its dirty flag, and status is refreshed. On
    /// failure the preview stays in place so it can be retried or discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the message has no pending preview, the request
    /// fails or the backend reports `success: false`.
    pub async fn apply(&self, key: &ConversationKey, id: MessageId) -> Result<()> {
        let preview = self.pending_preview(key, id)?;

        self.workspace.lock().log(
            LogLevel::Info,
            format!("Applying changes to {}...", preview.filename),
        );

        let result = self
            .client
            .apply_changes(&preview.filename, &preview.code)
            .await;

        match result {
            Ok(true) => {}
            Ok(false) => {
                self.workspace
                    .lock()
                    .log(LogLevel::Error, "Failed to apply changes");
                return Err(StudioError::ApplyRejected(preview.filename));
            }
            Err(e) => {
                self.workspace
                    .lock()
                    .log(LogLevel::Error, format!("Failed to apply changes: {e}"));
                return Err(e.into());
            }
        }

        {
            let mut ws = self.workspace.lock();
            ws.update_buffer(key, |m| reducer::mark_applied(m, id, &preview.filename));

            let target = ws.resolve_filename(&preview.filename).map(|f| f.path.clone());
            match target {
                Some(path) => {
                    ws.store_saved(&path, preview.code.clone());
                }
                None => {
                    tracing::debug!(filename = %preview.filename, "Applied file is not open");
                }
            }

            ws.log(LogLevel::Success, "Changes applied");
        }

        self.refresher.refresh().await;
        Ok(())
    }

    /// Reject a previewed change. Nothing is sent to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the message has no pending preview.
    pub fn discard(&self, key: &ConversationKey, id: MessageId) -> Result<()> {
        self.pending_preview(key, id)?;

        let mut ws = self.workspace.lock();
        ws.update_buffer(key, |m| reducer::mark_discarded(m, id));
        ws.log(LogLevel::Info, "Changes discarded");
        Ok(())
    }
}

impl std::fmt::Debug for ChangeReview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeReview")
            .field("base_url", &self.client.base_url())
            .finish_non_exhaustive()
    }
}
