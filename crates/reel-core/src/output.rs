//! Output units yielded by handlers.
//!
//! A turn produces an ordered sequence of [`OutputUnit`] values. Delegating
//! handlers relay their delegate's units unmodified, so the host always sees
//! the original source handler on each unit.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One unit of handler output relayed to the host, in production order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputUnit {
    /// Name of the handler that produced this unit.
    pub source: String,
    /// Free-form text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Structured payload (tool results, aggregates).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// ISO 8601 production timestamp.
    pub timestamp: String,
}

impl OutputUnit {
    /// Create a text unit.
    #[must_use]
    pub fn text(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: Some(text.into()),
            data: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Create a structured-data unit.
    #[must_use]
    pub fn data(source: impl Into<String>, data: Value) -> Self {
        Self {
            source: source.into(),
            text: None,
            data: Some(data),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Create a unit carrying both text and a structured payload.
    #[must_use]
    pub fn with_data(source: impl Into<String>, text: impl Into<String>, data: Value) -> Self {
        Self {
            source: source.into(),
            text: Some(text.into()),
            data: Some(data),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
