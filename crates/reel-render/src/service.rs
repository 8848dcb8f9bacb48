//! Generation service interface.
//!
//! The external video-generation API is consumed through this trait only:
//! `submit` starts one long-running operation, `poll` reports whether it
//! has finished and with what. Concrete implementations (and their
//! transport/auth) live outside this workspace.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::GenerateError;

/// Opaque token identifying one in-flight generation operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationHandle(String);

impl OperationHandle {
    /// Wrap a service-issued operation name.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The service-issued operation name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One submission to the generation service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    /// Canonical scene id this job renders.
    pub scene_id: String,
    /// Serialized structured prompt.
    pub prompt_payload: Value,
    /// Optional reference image, already validated against the storage
    /// scheme by the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image_uri: Option<String>,
    /// Storage location the service writes output under.
    pub output_uri: String,
}

/// The artifact a finished operation produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifact {
    /// Storage URI of the result.
    pub uri: String,
    /// MIME type reported by the service.
    pub mime_type: String,
}

/// Completion status of one operation.
///
/// While `done` is false both `result` and `error` are absent. Once done,
/// the service reports exactly one of them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    /// Whether the operation has reached a terminal state.
    pub done: bool,
    /// The produced artifact, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GeneratedArtifact>,
    /// The service-reported error, on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationStatus {
    /// A still-running status.
    #[must_use]
    pub fn pending() -> Self {
        Self::default()
    }

    /// A successful terminal status.
    #[must_use]
    pub fn succeeded(uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            done: true,
            result: Some(GeneratedArtifact {
                uri: uri.into(),
                mime_type: mime_type.into(),
            }),
            error: None,
        }
    }

    /// A failed terminal status.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            done: true,
            result: None,
            error: Some(message.into()),
        }
    }
}

/// External generation service driven by the fan-out engine.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Start one generation operation.
    async fn submit(&self, request: &SubmitRequest) -> Result<OperationHandle, GenerateError>;

    /// Check an operation's completion status.
    async fn poll(&self, handle: &OperationHandle) -> Result<OperationStatus, GenerateError>;
}
