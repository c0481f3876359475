//! Workspace state: conversation buffers, open files and pending input.
//!
//! The workspace is plain data. It is shared between the command loop and
//! running generations as [`SharedWorkspace`]; callers lock it for short,
//! non-async critical sections only.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use aifactory_client::StatusResponse;
use aifactory_core::path::{file_name, NormalizedPath};
use aifactory_core::{Attachment, ConversationKey, Message, MessageId, Mode};
use parking_lot::Mutex;

use crate::log::{ActivityLog, LogLevel};

/// Workspace shared between tasks.
pub type SharedWorkspace = Arc<Mutex<Workspace>>;

/// Model selected when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gemini/gemini-3-flash-preview";

/// Target file sent when no file is active.
pub const DEFAULT_GLOBAL_TARGET: &str = "General";

/// First message of the global conversation.
pub const WELCOME_TEXT: &str =
    "Welcome! This is the global context. How can I help you today?";

/// User-adjustable generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Model identifier sent with each generation.
    pub model: String,
    /// Planning or Act.
    pub mode: Mode,
    /// `target_file` used for the global conversation.
    pub global_target_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            mode: Mode::default(),
            global_target_file: DEFAULT_GLOBAL_TARGET.to_string(),
        }
    }
}

/// A file open in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFile {
    /// Path as given by the user or backend.
    pub path: String,
    /// Current (possibly edited) content.
    pub content: String,
    /// Whether `content` differs from what was last saved.
    pub is_dirty: bool,
    /// Path reported to the backend as `target_file`.
    pub target_file: String,
}

/// All client-side state.
#[derive(Debug)]
pub struct Workspace {
    buffers: HashMap<ConversationKey, Vec<Message>>,
    open_files: Vec<OpenFile>,
    active: Option<String>,
    attachments: Vec<Attachment>,
    in_flight: HashSet<ConversationKey>,
    log: ActivityLog,
    /// Prompt being composed.
    pub prompt: String,
    /// Generation settings.
    pub settings: Settings,
    /// Last status fetched from the backend.
    pub status: Option<StatusResponse>,
}

impl Workspace {
    /// Create a workspace whose global conversation holds the welcome message.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let mut buffers = HashMap::new();
        buffers.insert(ConversationKey::Global, vec![Message::ai(WELCOME_TEXT)]);
        Self {
            buffers,
            open_files: Vec::new(),
            active: None,
            attachments: Vec::new(),
            in_flight: HashSet::new(),
            log: ActivityLog::default(),
            prompt: String::new(),
            settings,
            status: None,
        }
    }

    /// Wrap into a [`SharedWorkspace`].
    #[must_use]
    pub fn shared(self) -> SharedWorkspace {
        Arc::new(Mutex::new(self))
    }

    // =========================================================================
    // Conversation Buffers
    // =========================================================================

    /// Key of the conversation currently shown.
    #[must_use]
    pub fn active_key(&self) -> ConversationKey {
        ConversationKey::for_path(self.active.as_deref())
    }

    /// Messages of a conversation, if it exists.
    #[must_use]
    pub fn buffer(&self, key: &ConversationKey) -> Option<&[Message]> {
        self.buffers.get(key).map(Vec::as_slice)
    }

    /// Messages of the active conversation.
    #[must_use]
    pub fn active_buffer(&self) -> &[Message] {
        self.buffer(&self.active_key()).unwrap_or_default()
    }

    /// Replace a conversation with `update(old)`.
    ///
    /// Returns `false` and does nothing if the conversation no longer exists,
    /// e.g. because its file was closed while a stream was running.
    pub fn update_buffer(
        &mut self,
        key: &ConversationKey,
        update: impl FnOnce(Vec<Message>) -> Vec<Message>,
    ) -> bool {
        match self.buffers.get_mut(key) {
            Some(messages) => {
                let old = std::mem::take(messages);
                *messages = update(old);
                true
            }
            None => false,
        }
    }

    /// Most recent message in a conversation carrying a pending preview.
    #[must_use]
    pub fn latest_preview(&self, key: &ConversationKey) -> Option<MessageId> {
        self.buffer(key)?
            .iter()
            .rev()
            .find(|m| m.preview.is_some())
            .map(|m| m.id)
    }

    // =========================================================================
    // Open Files
    // =========================================================================

    /// Open files in opening order.
    #[must_use]
    pub fn open_files(&self) -> &[OpenFile] {
        &self.open_files
    }

    /// Find an open file by path, ignoring separator style and case.
    #[must_use]
    pub fn find_open(&self, raw: &str) -> Option<&OpenFile> {
        let wanted = NormalizedPath::new(raw);
        self.open_files
            .iter()
            .find(|f| NormalizedPath::new(&f.path) == wanted)
    }

    fn find_open_mut(&mut self, raw: &str) -> Option<&mut OpenFile> {
        let wanted = NormalizedPath::new(raw);
        self.open_files
            .iter_mut()
            .find(|f| NormalizedPath::new(&f.path) == wanted)
    }

    /// Path of the active file.
    #[must_use]
    pub fn active_path(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The active file.
    #[must_use]
    pub fn active_file(&self) -> Option<&OpenFile> {
        self.active.as_deref().and_then(|p| self.find_open(p))
    }

    /// Register a freshly read file, create its conversation and activate it.
    ///
    /// If the file is already open it is only activated.
    pub fn insert_file(&mut self, path: &str, content: String, target_file: String) {
        if let Some(existing) = self.find_open(path) {
            self.active = Some(existing.path.clone());
            return;
        }

        self.open_files.push(OpenFile {
            path: path.to_string(),
            content,
            is_dirty: false,
            target_file,
        });
        self.buffers.insert(
            ConversationKey::for_path(Some(path)),
            vec![Message::ai(format!(
                "Started a conversation about file: {}",
                file_name(path)
            ))],
        );
        self.active = Some(path.to_string());
    }

    /// Make an open file active. Returns `false` if it is not open.
    pub fn activate(&mut self, raw: &str) -> bool {
        match self.find_open(raw) {
            Some(file) => {
                self.active = Some(file.path.clone());
                true
            }
            None => false,
        }
    }

    /// Show the global conversation.
    pub fn activate_global(&mut self) {
        self.active = None;
    }

    /// Close a file and drop its conversation.
    ///
    /// If it was active, the most recently opened remaining file becomes
    /// active. Returns `false` if the file was not open.
    pub fn close_file(&mut self, raw: &str) -> bool {
        let wanted = NormalizedPath::new(raw);
        let Some(index) = self
            .open_files
            .iter()
            .position(|f| NormalizedPath::new(&f.path) == wanted)
        else {
            return false;
        };

        let closed = self.open_files.remove(index);
        self.buffers.remove(&ConversationKey::File(wanted.clone()));

        let was_active = self
            .active
            .as_deref()
            .is_some_and(|a| NormalizedPath::new(a) == wanted);
        if was_active {
            self.active = self.open_files.last().map(|f| f.path.clone());
        }

        tracing::debug!(path = %closed.path, "Closed file");
        true
    }

    /// Replace the active file's content and mark it dirty.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::NoActiveFile`](crate::StudioError::NoActiveFile)
    /// if no file is active.
    pub fn edit_active(&mut self, content: String) -> crate::Result<()> {
        let path = self.active.clone().ok_or(crate::StudioError::NoActiveFile)?;
        let file = self
            .find_open_mut(&path)
            .ok_or(crate::StudioError::FileNotOpen(path))?;
        file.content = content;
        file.is_dirty = true;
        Ok(())
    }

    /// Overwrite a file with saved content and clear its dirty flag.
    ///
    /// Returns `false` if the file is not open.
    pub fn store_saved(&mut self, raw: &str, content: String) -> bool {
        match self.find_open_mut(raw) {
            Some(file) => {
                file.content = content;
                file.is_dirty = false;
                true
            }
            None => false,
        }
    }

    /// Find the open file a backend filename refers to.
    ///
    /// Exact (normalized) matches win; otherwise an open path ending with the
    /// filename matches, preferring the active file.
    #[must_use]
    pub fn resolve_filename(&self, filename: &str) -> Option<&OpenFile> {
        if let Some(exact) = self.find_open(filename) {
            return Some(exact);
        }

        let wanted = NormalizedPath::new(filename);
        let matches = |f: &&OpenFile| NormalizedPath::new(&f.path).ends_with(&wanted);
        self.active_file()
            .filter(matches)
            .or_else(|| self.open_files.iter().find(matches))
    }

    // =========================================================================
    // Attachments
    // =========================================================================

    /// Pending attachments.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Add a pending attachment.
    pub fn attach(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Drop all pending attachments.
    pub fn clear_attachments(&mut self) {
        self.attachments.clear();
    }

    /// Move the pending attachments out, leaving none behind.
    pub fn take_attachments(&mut self) -> Vec<Attachment> {
        std::mem::take(&mut self.attachments)
    }

    /// Put attachments back in front of any pending ones.
    pub fn restore_attachments(&mut self, mut attachments: Vec<Attachment>) {
        attachments.append(&mut self.attachments);
        self.attachments = attachments;
    }

    // =========================================================================
    // Target File
    // =========================================================================

    /// The `target_file` the next generation from the active conversation
    /// will carry.
    #[must_use]
    pub fn current_target(&self) -> &str {
        self.active_file()
            .map_or(&self.settings.global_target_file, |f| &f.target_file)
    }

    /// Set the `target_file` of the active file, or of the global
    /// conversation when no file is active.
    pub fn set_target(&mut self, target: String) {
        match self.active.clone() {
            Some(path) => {
                if let Some(file) = self.find_open_mut(&path) {
                    file.target_file = target;
                }
            }
            None => self.settings.global_target_file = target,
        }
    }

    // =========================================================================
    // Generation Slots
    // =========================================================================

    /// Claim the generation slot of a conversation.
    ///
    /// Returns `false` if a generation is already streaming into it.
    pub fn try_begin_generation(&mut self, key: &ConversationKey) -> bool {
        self.in_flight.insert(key.clone())
    }

    /// Release the generation slot of a conversation.
    pub fn end_generation(&mut self, key: &ConversationKey) {
        self.in_flight.remove(key);
    }

    /// Whether any generation is running.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        !self.in_flight.is_empty()
    }

    // =========================================================================
    // Activity Log
    // =========================================================================

    /// Record an activity log entry.
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log.push(level, message);
    }

    /// The activity log.
    #[must_use]
    pub fn activity(&self) -> &ActivityLog {
        &self.log
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// Path a file is reported under: relative to the project directory, without
/// leading separators.
#[must_use]
pub fn target_path(path: &str, project_dir: Option<&str>) -> String {
    let relative = project_dir
        .filter(|dir| !dir.is_empty())
        .and_then(|dir| path.strip_prefix(dir))
        .unwrap_or(path);
    relative.trim_start_matches(['/', '\\']).to_string()
}
