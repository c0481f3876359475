//! Common error types for the AI Factory client.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors shared by the client crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An invalid identifier was provided.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] crate::ids::IdError),

    /// A chat mode name that is neither `Planning` nor `Act`.
    #[error("unknown mode: {0}")]
    UnknownMode(String),
}
