//! Request and delegation types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One inbound request, as handed to the runtime by the host.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    /// Free-form user content for this turn.
    pub content: String,
    /// Authenticated identity for the turn, already validated upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acting_user_id: Option<String>,
    /// Structured payload accompanying the request (themes, prompts,
    /// render instructions). Null when the turn is purely conversational.
    #[serde(default)]
    pub payload: Value,
}

impl TurnRequest {
    /// A plain text request without structured payload.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            acting_user_id: None,
            payload: Value::Null,
        }
    }

    /// Attach an acting identity.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.acting_user_id = Some(user_id.into());
        self
    }

    /// Attach a structured payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// A typed instruction to hand the turn to a sub-handler.
///
/// Handlers never call each other directly — they return one of these and
/// the runtime loop executes it, keeping the hierarchy explicit and the
/// depth bounded.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegation {
    /// Registered name of the sub-handler to invoke.
    pub handler_id: String,
    /// Payload handed to the sub-handler.
    pub payload: Value,
}
