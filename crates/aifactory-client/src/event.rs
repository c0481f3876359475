//! Generation stream events.
//!
//! Each NDJSON line carries one JSON object tagged by `type`. Unknown types
//! are tolerated so that newer backends do not break older clients.

use futures::{Stream, TryStreamExt};
use serde::Deserialize;

/// One event decoded from the generation stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental text to append.
    Chunk {
        /// Text delta.
        content: String,
    },
    /// A proposed file change that needs user approval.
    Preview {
        /// Human-readable summary of the change.
        explanation: String,
        /// Proposed file content.
        code: String,
        /// File the change targets.
        filename: String,
    },
    /// The backend blocked an unsafe action.
    SecurityWarning {
        /// Names of the detected threats.
        #[serde(default)]
        threats: Vec<String>,
    },
    /// The backend finished this generation.
    Done,
    /// Any `type` this client does not know.
    #[serde(other)]
    Unknown,
}

/// Parse one line.
///
/// Returns `Ok(None)` for blank lines.
///
/// # Errors
///
/// Returns the JSON error if the line is not a well-formed event.
pub fn parse_line(line: &str) -> Result<Option<StreamEvent>, serde_json::Error> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Parse a line, logging and dropping anything that is not a known event.
#[must_use]
pub fn decode_event(line: &str) -> Option<StreamEvent> {
    match parse_line(line) {
        Ok(Some(StreamEvent::Unknown)) => {
            tracing::debug!(line = %line, "Ignoring unknown stream event");
            None
        }
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, line = %line, "Failed to parse stream line");
            None
        }
    }
}

/// Adapt a stream of lines into a stream of known events.
///
/// Malformed lines never end the stream; transport errors do.
pub fn events<S, E>(lines: S) -> impl Stream<Item = Result<StreamEvent, E>>
where
    S: Stream<Item = Result<String, E>>,
{
    lines.try_filter_map(|line| futures::future::ready(Ok(decode_event(&line))))
}
