//! Studio: the context object tying the client, workspace and services.
//!
//! Constructed once at startup and passed around explicitly; there is no
//! global API base URL, key or active-file pointer anywhere else.

use std::path::Path;
use std::sync::Arc;

use aifactory_client::{ApiClient, ModelInfo};
use aifactory_core::path::file_name;
use aifactory_core::Attachment;
use base64::Engine;

use crate::error::{Result, StudioError};
use crate::log::LogLevel;
use crate::orchestrator::Orchestrator;
use crate::render;
use crate::review::ChangeReview;
use crate::status::{ClientStatusRefresh, StatusRefresh};
use crate::workspace::{target_path, Settings, SharedWorkspace, Workspace};

/// Application state shared by the command loop and background generations.
#[derive(Clone)]
pub struct Studio {
    client: ApiClient,
    workspace: SharedWorkspace,
    refresher: Arc<dyn StatusRefresh>,
}

impl Studio {
    /// Create a studio that refreshes status from the backend.
    #[must_use]
    pub fn new(client: ApiClient, settings: Settings) -> Self {
        let workspace = Workspace::new(settings).shared();
        let refresher = Arc::new(ClientStatusRefresh::new(
            client.clone(),
            Arc::clone(&workspace),
        ));
        Self::with_refresher(client, workspace, refresher)
    }

    /// Create a studio with a custom status refresher.
    #[must_use]
    pub fn with_refresher(
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

    /// The shared workspace.
    #[must_use]
    pub fn workspace(&self) -> &SharedWorkspace {
        &self.workspace
    }

    /// A generation orchestrator bound to this studio.
    #[must_use]
    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            self.client.clone(),
            Arc::clone(&self.workspace),
            Arc::clone(&self.refresher),
        )
    }

    /// A change reviewer bound to this studio.
    #[must_use]
    pub fn review(&self) -> ChangeReview {
        ChangeReview::new(
            self.client.clone(),
            Arc::clone(&self.workspace),
            Arc::clone(&self.refresher),
        )
    }

    /// Reload backend status.
    pub async fn refresh_status(&self) {
        self.refresher.refresh().await;
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// Open a file, reading it from the backend unless it is already open.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot read the file.
    pub async fn open_file(&self, path: &str) -> Result<()> {
        if self.workspace.lock().activate(path) {
            return Ok(());
        }

        let content = match self.client.read_file(path).await {
            Ok(content) => content,
            Err(e) => {
                self.workspace
                    .lock()
                    .log(LogLevel::Error, format!("Failed to read {path}: {e}"));
                return Err(e.into());
            }
        };

        let mut ws = self.workspace.lock();
        let project_dir = ws.status.as_ref().map(|s| s.project_dir.clone());
        let target = target_path(path, project_dir.as_deref());
        ws.insert_file(path, content, target);
        ws.log(LogLevel::Info, format!("Opened {}", file_name(path)));
        Ok(())
    }

    /// Close a file and its conversation.
    ///
    /// A generation still streaming into it keeps running; its updates are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::FileNotOpen`] if the file is not open.
    pub fn close_file(&self, path: &str) -> Result<()> {
        if self.workspace.lock().close_file(path) {
            Ok(())
        } else {
            Err(StudioError::FileNotOpen(path.to_string()))
        }
    }

    /// Make an open file active.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::FileNotOpen`] if the file is not open.
    pub fn switch_to(&self, path: &str) -> Result<()> {
        if self.workspace.lock().activate(path) {
            Ok(())
        } else {
            Err(StudioError::FileNotOpen(path.to_string()))
        }
    }

    /// Show the global conversation.
    pub fn switch_global(&self) {
        self.workspace.lock().activate_global();
    }

    /// Replace the active file's content with a local file's content.
    ///
    /// # Errors
    ///
    /// Returns an error if no file is active or the local file is unreadable.
    pub async fn edit_from(&self, source: &Path) -> Result<()> {
        let content = tokio::fs::read_to_string(source).await?;
        self.workspace.lock().edit_active(content)
    }

    /// Save the active file through the backend.
    ///
    /// Returns `false` if the backend refused the save (for example because
    /// its security scan found threats).
    ///
    /// # Errors
    ///
    /// Returns an error if no file is active or the request fails.
    pub async fn save_active(&self) -> Result<bool> {
        let (path, target, content) = {
            let ws = self.workspace.lock();
            let file = ws.active_file().ok_or(StudioError::NoActiveFile)?;
            (file.path.clone(), file.target_file.clone(), file.content.clone())
        };

        let response = self.client.save_file(&target, &content).await?;

        let mut ws = self.workspace.lock();
        if response.success {
            ws.store_saved(&path, content);
            ws.log(LogLevel::Success, format!("Saved {}", file_name(&path)));
        } else if response.threats.is_empty() {
            let reason = response.message.unwrap_or_else(|| "unknown reason".to_string());
            ws.log(LogLevel::Error, format!("Save refused: {reason}"));
        } else {
            ws.log(
                LogLevel::Error,
                format!("Save blocked, threats: {}", response.threats.join(", ")),
            );
        }
        Ok(response.success)
    }

    /// Choose the file the agent writes to from the active conversation.
    ///
    /// Paths inside the project directory are stored relative to it. Returns
    /// the stored target.
    pub fn set_target(&self, path: &str) -> String {
        let mut ws = self.workspace.lock();
        let project_dir = ws.status.as_ref().map(|s| s.project_dir.clone());
        let target = target_path(path, project_dir.as_deref());
        ws.set_target(target.clone());
        ws.log(LogLevel::Success, format!("Target file: {}", file_name(&target)));
        target
    }

    /// Export the active conversation as a markdown transcript.
    ///
    /// Writes to `dest` when given, otherwise to the system clipboard.
    /// Returns `false` when the conversation is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or the clipboard cannot be written.
    pub async fn copy_chat(&self, dest: Option<&Path>) -> Result<bool> {
        let transcript = {
            let ws = self.workspace.lock();
            render::transcript(ws.active_buffer())
        };
        let Some(text) = transcript else {
            return Ok(false);
        };

        let result = match dest {
            Some(path) => tokio::fs::write(path, &text).await.map_err(StudioError::from),
            None => copy_to_clipboard(&text),
        };

        let mut ws = self.workspace.lock();
        match &result {
            Ok(()) => ws.log(LogLevel::Success, "Chat copied"),
            Err(e) => ws.log(LogLevel::Error, format!("Failed to copy chat: {e}")),
        }
        result.map(|()| true)
    }

    // =========================================================================
    // Attachments
    // =========================================================================

    /// Attach a local file to the next prompt.
    ///
    /// Images are sent as base64 data URLs; everything else as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn attach(&self, source: &Path) -> Result<()> {
        let name = source
            .file_name()
            .map_or_else(|| source.display().to_string(), |n| n.to_string_lossy().into_owned());

        let attachment = match image_mime(source) {
            Some(mime) => {
                let bytes = tokio::fs::read(source).await?;
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                Attachment::image(name, format!("data:{mime};base64,{encoded}"))
            }
            None => {
                let bytes = tokio::fs::read(source).await?;
                Attachment::file(name, String::from_utf8_lossy(&bytes).into_owned())
            }
        };

        let mut ws = self.workspace.lock();
        ws.log(LogLevel::Info, format!("Attached {}", attachment.name));
        ws.attach(attachment);
        Ok(())
    }

    // =========================================================================
    // Models
    // =========================================================================

    /// List the models offered by the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn models(&self) -> Result<Vec<ModelInfo>> {
        Ok(self.client.models().await?)
    }

    /// Switch the model used for generations.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the switch.
    pub async fn set_model(&self, model_id: &str) -> Result<()> {
        let response = self.client.set_model(model_id).await?;
        let message = format!("Model switched to {}", response.current_model);
        let mut ws = self.workspace.lock();
        ws.settings.model = response.current_model;
        ws.log(LogLevel::Info, message);
        Ok(())
    }
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("base_url", &self.client.base_url())
            .finish_non_exhaustive()
    }
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| StudioError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| StudioError::Clipboard(e.to_string()))
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_mime_by_extension() {
        assert_eq!(image_mime(Path::new("shot.PNG")), Some("image/png"));
        assert_eq!(image_mime(Path::new("a/b.jpeg")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("notes.txt")), None);
        assert_eq!(image_mime(Path::new("Makefile")), None);
    }
}
