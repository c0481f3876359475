//! Client configuration.
//!
//! Built once at startup and handed to [`ApiClient`](crate::ApiClient); nothing
//! in the client reads global state.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for talking to the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend (e.g., "http://localhost:8000").
    #[serde(default = "ClientConfig::default_base_url")]
    pub base_url: String,

    /// API key sent as `X-API-Key` on every request.
    #[serde(default)]
    pub api_key: String,

    /// Timeout for plain request/response calls, in seconds.
    ///
    /// Not applied to the generation stream, which may legitimately run for
    /// a long time.
    #[serde(default = "ClientConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// TCP connect timeout, in seconds.
    #[serde(default = "ClientConfig::default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl ClientConfig {
    fn default_base_url() -> String {
        "http://localhost:8000".to_string()
    }

    const fn default_request_timeout() -> u64 {
        300 // 5 minutes
    }

    const fn default_connect_timeout() -> u64 {
        10
    }

    /// Create a configuration for the given backend and key.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Get the connect timeout as a `Duration`.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            api_key: String::new(),
            request_timeout_seconds: Self::default_request_timeout(),
            connect_timeout_seconds: Self::default_connect_timeout(),
        }
    }
}
