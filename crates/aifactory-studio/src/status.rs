//! Refreshing backend status after work completes.

use aifactory_client::ApiClient;
use async_trait::async_trait;

use crate::workspace::SharedWorkspace;

/// Something that reloads externally owned status (token usage, file list).
///
/// This trait abstracts the refresh so tests can count calls instead of
/// hitting `/status`.
#[async_trait]
pub trait StatusRefresh: Send + Sync {
    /// Reload status. Failures are logged, never returned.
    async fn refresh(&self);
}

/// Refreshes status from the backend's `/status` endpoint.
#[derive(Debug, Clone)]
pub struct ClientStatusRefresh {
    client: ApiClient,
    workspace: SharedWorkspace,
}

impl ClientStatusRefresh {
    /// Create a refresher that stores results in `workspace`.
    #[must_use]
    pub fn new(client: ApiClient, workspace: SharedWorkspace) -> Self {
        Self { client, workspace }
    }
}

#[async_trait]
impl StatusRefresh for ClientStatusRefresh {
    async fn refresh(&self) {
        match self.client.status().await {
            Ok(status) => {
                tracing::debug!(
                    total_tokens = status.total_tokens,
                    files = status.files.len(),
                    "Status refreshed"
                );
                self.workspace.lock().status = Some(status);
            }
            Err(e) => tracing::warn!(error = %e, "Failed to refresh status"),
        }
    }
}
