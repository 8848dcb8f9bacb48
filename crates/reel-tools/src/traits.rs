//! Core trait and context types for the tool system.
//!
//! Defines [`ReelTool`] — the trait every tool implements — plus the
//! execution context tools receive. Handlers invoke tools by name through
//! the [`ToolRegistry`](crate::registry::ToolRegistry) with JSON
//! parameters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use reel_session::SessionStore;

use crate::errors::ToolError;

// ─────────────────────────────────────────────────────────────────────────────
// Tool context
// ─────────────────────────────────────────────────────────────────────────────

/// Execution context passed to every tool invocation.
#[derive(Clone, Debug)]
pub struct ToolContext {
    /// Unique ID of this tool call.
    pub tool_call_id: String,
    /// The conversation's shared state.
    pub session: SessionStore,
    /// Cancellation token for cooperative cancellation.
    pub cancellation: CancellationToken,
}

impl ToolContext {
    /// Build a context for one tool call.
    #[must_use]
    pub fn new(session: SessionStore, cancellation: CancellationToken) -> Self {
        Self {
            tool_call_id: uuid::Uuid::now_v7().to_string(),
            session,
            cancellation,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Schema types
// ─────────────────────────────────────────────────────────────────────────────

/// JSON schema fragment describing a tool's parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolParameterSchema {
    /// Always `"object"` for tool parameters.
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Per-property schemas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
    /// Required property names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// A tool's advertised interface.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name — the exact string used for dispatch.
    pub name: String,
    /// Natural-language description of the work the tool performs.
    pub description: String,
    /// Parameter schema.
    pub parameters: ToolParameterSchema,
}

/// Result of one tool execution.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    /// Human-readable summary.
    pub content: String,
    /// Structured payload for the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolOutput {
    /// A text-only output.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            data: None,
        }
    }

    /// An output with a structured payload.
    #[must_use]
    pub fn with_data(content: impl Into<String>, data: Value) -> Self {
        Self {
            content: content.into(),
            data: Some(data),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ReelTool trait
// ─────────────────────────────────────────────────────────────────────────────

/// The core trait that every tool must implement.
#[async_trait]
pub trait ReelTool: Send + Sync {
    /// Tool name — the exact string used for dispatch.
    fn name(&self) -> &str;

    /// Short natural-language description of the work performed.
    fn description(&self) -> &str;

    /// The tool's advertised interface.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with JSON parameters.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolOutput, ToolError>;
}
