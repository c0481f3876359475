//! HTTP client for the backend API.
//!
//! This module provides a typed client for the AI Factory backend. Every
//! request carries the `X-API-Key` header from [`ClientConfig`].

use std::pin::Pin;

use futures::{Stream, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::event::{self, StreamEvent};
use crate::ndjson;
use crate::types::{
    ApiErrorResponse, ApplyChangesRequest, ApplyChangesResponse, GenerateRequest, ModelInfo,
    ModelsResponse, ReadFileResponse, SaveFileResponse, SetModelResponse, StatusResponse,
};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Events of one generation, in arrival order.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Client for the backend REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value or the
    /// underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut key =
            HeaderValue::from_str(&config.api_key).map_err(|_| ClientError::InvalidApiKey)?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    /// Handle API error responses.
    async fn handle_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let message = match response.json::<ApiErrorResponse>().await {
            Ok(err) => err.message(),
            Err(_) => "Unknown error".to_string(),
        };
        ClientError::Api { status, message }
    }

    /// Check the status and decode a JSON body.
    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::handle_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    // =========================================================================
    // Generation
    // =========================================================================

    /// Start a generation and return its event stream.
    ///
    /// The returned stream yields events in arrival order. Malformed lines are
    /// logged and skipped; a broken connection ends the stream with
    /// [`ClientError::Stream`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers with a
    /// non-success status.
    pub async fn stream_generate(&self, request: &GenerateRequest) -> Result<EventStream> {
        let url = format!("{}/stream-generate", self.base_url);

        tracing::debug!(
            target_file = %request.target_file,
            model = %request.model,
            attachments = request.attachments.len(),
            "Opening generation stream"
        );

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            return Err(Self::handle_error(response).await);
        }

        let chunks = response
            .bytes_stream()
            .map_err(|e| ClientError::Stream(e.to_string()));

        Ok(Box::pin(event::events(ndjson::lines(chunks))))
    }

    // =========================================================================
    // Change Review
    // =========================================================================

    /// Write approved content to a file on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not understood.
    pub async fn apply_changes(&self, filename: &str, content: &str) -> Result<bool> {
        let url = format!("{}/apply-changes", self.base_url);

        let request = ApplyChangesRequest {
            filename: filename.to_string(),
            content: content.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .timeout(self.config.request_timeout())
            .json(&request)
            .send()
            .await?;

        let body: ApplyChangesResponse = Self::decode(response).await?;
        Ok(body.success)
    }

    // =========================================================================
    // Workspace
    // =========================================================================

    /// Fetch token usage, project directory, model and file list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not understood.
    pub async fn status(&self) -> Result<StatusResponse> {
        let url = format!("{}/status", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.config.request_timeout())
            .send()
            .await?;

        Self::decode(response).await
    }

    /// List the models offered by the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not understood.
    pub async fn models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.config.request_timeout())
            .send()
            .await?;

        let body: ModelsResponse = Self::decode(response).await?;
        Ok(body.models)
    }

    /// Switch the backend's model.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not understood.
    pub async fn set_model(&self, model_id: &str) -> Result<SetModelResponse> {
        let url = format!("{}/set-model", self.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(self.config.request_timeout())
            .query(&[("model_id", model_id)])
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Read a file from the backend's project.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the file does not exist.
    pub async fn read_file(&self, path: &str) -> Result<String> {
        let url = format!("{}/read-file", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.config.request_timeout())
            .query(&[("path", path)])
            .send()
            .await?;

        let body: ReadFileResponse = Self::decode(response).await?;
        Ok(body.content)
    }

    /// Save a file; the backend scans the content before writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not understood.
    pub async fn save_file(&self, path: &str, content: &str) -> Result<SaveFileResponse> {
        let url = format!("{}/save-file", self.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(self.config.request_timeout())
            .query(&[("path", path), ("content", content)])
            .send()
            .await?;

        Self::decode(response).await
    }

    // =========================================================================
    // Utility
    // =========================================================================

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
