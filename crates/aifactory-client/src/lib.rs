//! HTTP and streaming client for the AI Factory backend.
//!
//! The backend answers generation requests with a chunked body of
//! newline-delimited JSON. This crate turns that body into a stream of
//! [`StreamEvent`]s:
//!
//! ```text
//! bytes ──▶ ndjson::FrameDecoder ──▶ lines ──▶ event::decode_event ──▶ StreamEvent
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use aifactory_client::{ApiClient, ClientConfig, GenerateRequest, StreamEvent};
//! use aifactory_core::Mode;
//! use futures::StreamExt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ClientConfig::new("http://localhost:8000", "secret"))?;
//!
//! let request = GenerateRequest {
//!     prompt: "Add a docstring".to_string(),
//!     target_file: "General".to_string(),
//!     model: "gpt-4o-mini".to_string(),
//!     attachments: Vec::new(),
//!     mode: Mode::Planning,
//! };
//!
//! let mut events = client.stream_generate(&request).await?;
//! while let Some(event) = events.next().await {
//!     if let StreamEvent::Chunk { content } = event? {
//!         print!("{content}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod ndjson;
pub mod types;

pub use client::{ApiClient, EventStream, API_KEY_HEADER};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use event::StreamEvent;
pub use ndjson::FrameDecoder;
pub use types::{
    AttachmentPayload, GenerateRequest, ModelInfo, SaveFileResponse, SetModelResponse,
    StatusResponse,
};
