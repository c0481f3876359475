//! Request and response types for the backend API.

use aifactory_core::{Attachment, AttachmentKind, Mode};
use serde::{Deserialize, Serialize};

// =============================================================================
// Generation
// =============================================================================

/// Attachment as sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentPayload {
    /// Display name.
    pub name: String,
    /// Attachment kind.
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    /// Text content or data URL.
    pub data: String,
}

impl From<&Attachment> for AttachmentPayload {
    fn from(att: &Attachment) -> Self {
        Self {
            name: att.name.clone(),
            kind: att.kind,
            data: att.data.clone(),
        }
    }
}

/// Body of `POST /stream-generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// User prompt.
    pub prompt: String,
    /// File the backend should work on, or `General`.
    pub target_file: String,
    /// Model identifier.
    pub model: String,
    /// Attached files and images.
    pub attachments: Vec<AttachmentPayload>,
    /// Planning or Act.
    pub mode: Mode,
}

// =============================================================================
// Change Review
// =============================================================================

/// Body of `POST /apply-changes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyChangesRequest {
    /// Target file.
    pub filename: String,
    /// New file content.
    pub content: String,
}

/// Response of `POST /apply-changes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyChangesResponse {
    /// Whether the backend wrote the file.
    pub success: bool,
}

// =============================================================================
// Workspace
// =============================================================================

/// Response of `GET /status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Tokens used so far.
    pub total_tokens: u64,
    /// Project directory on the backend.
    pub project_dir: String,
    /// Backend's current model.
    pub model: String,
    /// Project files, relative to `project_dir`.
    #[serde(default)]
    pub files: Vec<String>,
}

/// One model offered by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Response of `GET /models`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    /// Available models.
    pub models: Vec<ModelInfo>,
}

/// Response of `POST /set-model`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetModelResponse {
    /// Whether the switch succeeded.
    pub success: bool,
    /// Model now in use.
    pub current_model: String,
}

/// Response of `GET /read-file`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadFileResponse {
    /// File content.
    pub content: String,
}

/// Response of `POST /save-file`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveFileResponse {
    /// Whether the file was written.
    pub success: bool,
    /// Backend message.
    #[serde(default)]
    pub message: Option<String>,
    /// Threats found by the security scan, when the save was refused.
    #[serde(default)]
    pub threats: Vec<String>,
}

// =============================================================================
// Error Response
// =============================================================================

/// Error body returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Error detail; usually a string, sometimes a validation object.
    pub detail: serde_json::Value,
}

impl ApiErrorResponse {
    /// Render the detail as a message.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generate_request_wire_shape() {
        let request = GenerateRequest {
            prompt: "fix".to_string(),
            target_file: "src/x.py".to_string(),
            model: "gpt-4o".to_string(),
            attachments: vec![AttachmentPayload::from(&Attachment::file("x.py", "print(1)"))],
            mode: Mode::Act,
        };
        let v = serde_json::to_value(&request).unwrap();
        assert_eq!(
            v,
            json!({
                "prompt": "fix",
                "target_file": "src/x.py",
                "model": "gpt-4o",
                "attachments": [{"name": "x.py", "type": "file", "data": "print(1)"}],
                "mode": "Act"
            })
        );
    }

    #[test]
    fn error_detail_message() {
        let err: ApiErrorResponse = serde_json::from_value(json!({"detail": "nope"})).unwrap();
        assert_eq!(err.message(), "nope");
        let err: ApiErrorResponse =
            serde_json::from_value(json!({"detail": [{"loc": ["query"]}]})).unwrap();
        assert!(err.message().contains("loc"));
    }

    #[test]
    fn save_response_with_threats() {
        let resp: SaveFileResponse = serde_json::from_value(json!({
            "success": false,
            "message": "Security check failed",
            "threats": ["os.system"]
        }))
        .unwrap();
        assert!(!resp.success);
        assert_eq!(resp.threats, vec!["os.system"]);
    }
}
