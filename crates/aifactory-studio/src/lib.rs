//! Terminal workspace for the AI Factory backend.
//!
//! The studio keeps one conversation per open file plus a global one, sends
//! prompts to the backend's streaming endpoint and routes every event of a
//! generation back to the conversation it was sent from.
//!
//! # Architecture
//!
//! ```text
//!             ┌──────────────────────────────────────────┐
//!             │          Studio (context object)         │
//!             └──────────────────────────────────────────┘
//!                 │                  │                │
//!                 ▼                  ▼                ▼
//!          ┌─────────────┐   ┌──────────────┐  ┌─────────────┐
//!          │Orchestrator │   │ ChangeReview │  │  Workspace  │
//!          │  (stream)   │   │(apply/discard│  │  (buffers,  │
//!          └──────┬──────┘   └──────────────┘  │ open files) │
//!                 │                            └─────────────┘
//!                 ▼                                   ▲
//!   FrameDecoder → StreamEvent → Route ── reducer ────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use aifactory_client::{ApiClient, ClientConfig};
//! use aifactory_studio::{Settings, Studio};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ClientConfig::new("http://localhost:8000", "secret"))?;
//! let studio = Studio::new(client, Settings::default());
//!
//! studio.open_file("src/main.py").await?;
//! studio.workspace().lock().prompt = "Add type hints".to_string();
//!
//! let outcome = studio.orchestrator().send().await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod app;
pub mod command;
pub mod error;
pub mod log;
pub mod markdown;
pub mod orchestrator;
pub mod render;
pub mod review;
pub mod router;
pub mod status;
pub mod workspace;

pub use app::Studio;
pub use command::Command;
pub use error::{Result, StudioError};
pub use log::{ActivityLog, LogLevel};
pub use orchestrator::{GenerationContext, GenerationOutcome, Orchestrator, PreparedGeneration};
pub use review::ChangeReview;
pub use router::Route;
pub use status::{ClientStatusRefresh, StatusRefresh};
pub use workspace::{OpenFile, Settings, SharedWorkspace, Workspace};
