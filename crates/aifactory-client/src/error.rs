//! Error type for client operations.

/// A result type using `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The response stream broke while being read.
    #[error("Stream error: {0}")]
    Stream(String),

    /// The API key cannot be used as a header value.
    #[error("Invalid API key header")]
    InvalidApiKey,
}
