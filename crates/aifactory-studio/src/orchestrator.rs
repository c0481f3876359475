//! Generation orchestrator.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──send──▶ Sending ──stream open──▶ Streaming ──end of stream──▶ Idle
//!    ▲               │                          │
//!    │               │ transport/HTTP error     │ read error
//!    │               ▼                          ▼
//!    └─────────── Failed ◀──────────────────────┘
//! ```
//!
//! [`Orchestrator::prepare`] performs `Idle → Sending`: it validates input,
//! claims the origin conversation's generation slot, takes the pending
//! attachments, then appends the user message and the streaming
//! placeholder. [`Orchestrator::run`] drives the rest. Whatever happens,
//! the origin conversation is finalized and its slot released when the
//! [`PreparedGeneration`] is consumed or dropped.

use std::sync::Arc;

use aifactory_client::{ApiClient, AttachmentPayload, EventStream, GenerateRequest};
use aifactory_core::path::file_name;
use aifactory_core::{reducer, Attachment, ConversationKey, Message, Mode, RequestId};
use futures::StreamExt;

use crate::error::{Result, StudioError};
use crate::log::LogLevel;
use crate::router::Route;
use crate::status::StatusRefresh;
use crate::workspace::{SharedWorkspace, Workspace};

/// User message text used when only attachments are sent.
pub const ATTACHMENTS_ONLY_TEXT: &str = "Analyze the attached files...";

/// Everything captured at send time for one generation.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Request identifier, for logs.
    pub request_id: RequestId,
    /// Active file when the message was sent.
    pub origin_path: Option<String>,
    /// Prompt text.
    pub prompt: String,
    /// `target_file` sent to the backend.
    pub target_file: String,
    /// Model identifier.
    pub model: String,
    /// Attachments, including the active file.
    pub attachments: Vec<Attachment>,
    /// Planning or Act.
    pub mode: Mode,
}

impl GenerationContext {
    fn capture(ws: &Workspace, pending: Vec<Attachment>) -> Self {
        let active = ws.active_file();

        let mut attachments = pending;
        if let Some(file) = active {
            let name = file_name(&file.path);
            if !attachments.iter().any(|a| a.name == name) {
                attachments.push(Attachment::file(name, file.content.clone()));
            }
        }

        Self {
            request_id: RequestId::generate(),
            origin_path: ws.active_path().map(str::to_string),
            prompt: ws.prompt.clone(),
            target_file: active.map_or_else(
                || ws.settings.global_target_file.clone(),
                |f| f.target_file.clone(),
            ),
            model: ws.settings.model.clone(),
            attachments,
            mode: ws.settings.mode,
        }
    }

    /// Build the request body.
    #[must_use]
    pub fn to_request(&self) -> GenerateRequest {
        GenerateRequest {
            prompt: self.prompt.clone(),
            target_file: self.target_file.clone(),
            model: self.model.clone(),
            attachments: self.attachments.iter().map(AttachmentPayload::from).collect(),
            mode: self.mode,
        }
    }
}

/// Finalizes the origin conversation and releases its slot on drop.
struct GenerationGuard {
    workspace: SharedWorkspace,
    key: ConversationKey,
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        let mut ws = self.workspace.lock();
        ws.update_buffer(&self.key, reducer::finalize);
        ws.end_generation(&self.key);
    }
}

/// A generation that passed `Idle → Sending` and waits to be run.
pub struct PreparedGeneration {
    context: GenerationContext,
    route: Route,
    guard: GenerationGuard,
    // User attachments taken from the workspace; handed back on failure.
    pending: Vec<Attachment>,
}

impl PreparedGeneration {
    /// The captured request context.
    #[must_use]
    pub const fn context(&self) -> &GenerationContext {
        &self.context
    }

    /// Where events will be routed.
    #[must_use]
    pub const fn route(&self) -> &Route {
        &self.route
    }
}

impl std::fmt::Debug for PreparedGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedGeneration")
            .field("context", &self.context)
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

/// How a generation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The stream ended normally.
    Completed {
        /// Request identifier.
        request_id: RequestId,
        /// Number of events applied.
        events: usize,
    },
    /// The request or the stream failed.
    Failed {
        /// Request identifier.
        request_id: RequestId,
        /// Error description.
        error: String,
    },
}

impl GenerationOutcome {
    /// Whether the stream ended normally.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Drives generation requests from send to finalization.
#[derive(Clone)]
pub struct Orchestrator {
    client: ApiClient,
    workspace: SharedWorkspace,
    refresher: Arc<dyn StatusRefresh>,
}

impl Orchestrator {
    /// Create an orchestrator.
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

    /// `Idle → Sending`: capture the request and add the pending messages.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::EmptyPrompt`] when there is nothing to send and
    /// [`StudioError::AlreadyStreaming`] when the active conversation already
    /// has a generation running.
    pub fn prepare(&self) -> Result<PreparedGeneration> {
        let mut ws = self.workspace.lock();

        if ws.prompt.trim().is_empty() && ws.attachments().is_empty() {
            return Err(StudioError::EmptyPrompt);
        }

        let route = Route::from_origin(ws.active_path());
        if !ws.try_begin_generation(route.key()) {
            return Err(StudioError::AlreadyStreaming(route.key().clone()));
        }

        let pending = ws.take_attachments();
        let context = GenerationContext::capture(&ws, pending.clone());
        let user_text = if context.prompt.trim().is_empty() {
            ATTACHMENTS_ONLY_TEXT.to_string()
        } else {
            context.prompt.clone()
        };
        let model = context.model.clone();
        route.update(&mut ws, |mut messages| {
            messages.push(Message::user(user_text));
            messages.push(Message::streaming_placeholder(model));
            messages
        });
        ws.log(LogLevel::Info, "AI agent: working on the task...");

        tracing::debug!(
            request_id = %context.request_id,
            conversation = %route.key(),
            "Generation prepared"
        );

        let guard = GenerationGuard {
            workspace: Arc::clone(&self.workspace),
            key: route.key().clone(),
        };

        Ok(PreparedGeneration {
            context,
            route,
            guard,
            pending,
        })
    }

    /// `Sending → Streaming → Idle`: issue the request and apply its events.
    ///
    /// Never fails: errors are logged and reported in the outcome. The origin
    /// conversation is finalized before this returns.
    pub async fn run(&self, prepared: PreparedGeneration) -> GenerationOutcome {
        let request = prepared.context.to_request();
        match self.client.stream_generate(&request).await {
            Ok(events) => self.run_events(prepared, events).await,
            Err(e) => self.fail(prepared, &e.to_string()),
        }
    }

    /// `Streaming → Idle`: apply the events of an already open stream.
    ///
    /// A read error ends the generation as failed; events applied before it
    /// stay in the conversation.
    pub async fn run_events(
        &self,
        prepared: PreparedGeneration,
        mut events: EventStream,
    ) -> GenerationOutcome {
        let mut applied = 0usize;
        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    prepared.route.dispatch(&mut self.workspace.lock(), event);
                    applied += 1;
                }
                Err(e) => return self.fail(prepared, &e.to_string()),
            }
        }

        let PreparedGeneration { context, guard, .. } = prepared;
        {
            let mut ws = self.workspace.lock();
            ws.prompt.clear();
            ws.log(LogLevel::Success, "Generation finished");
        }
        drop(guard);

        tracing::debug!(
            request_id = %context.request_id,
            events = applied,
            "Generation completed"
        );
        self.refresher.refresh().await;

        GenerationOutcome::Completed {
            request_id: context.request_id,
            events: applied,
        }
    }

    /// Prepare and run in one step.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Orchestrator::prepare`].
    pub async fn send(&self) -> Result<GenerationOutcome> {
        let prepared = self.prepare()?;
        Ok(self.run(prepared).await)
    }

    fn fail(&self, prepared: PreparedGeneration, error: &str) -> GenerationOutcome {
        let PreparedGeneration {
            context,
            guard,
            pending,
            ..
        } = prepared;
        {
            let mut ws = self.workspace.lock();
            ws.log(LogLevel::Error, format!("Service error: {error}"));
            // Only restore into an empty tray so later attachments are kept.
            if ws.attachments().is_empty() {
                ws.restore_attachments(pending);
            }
        }
        drop(guard);

        tracing::debug!(request_id = %context.request_id, error = %error, "Generation failed");
        GenerationOutcome::Failed {
            request_id: context.request_id,
            error: error.to_string(),
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("base_url", &self.client.base_url())
            .finish_non_exhaustive()
    }
}
