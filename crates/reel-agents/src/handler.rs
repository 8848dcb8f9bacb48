//! Handler trait and turn context.
//!
//! A handler is a specialist unit of work. Its invocation either ends the
//! turn (terminal outputs) or returns a typed [`Delegation`] naming the
//! next sub-handler; the runtime loop performs the hand-off. Handlers are
//! black boxes to the router — it only reads their capability description.

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use reel_core::OutputUnit;
use reel_session::SessionStore;
use reel_tools::{ToolContext, ToolRegistry};

use crate::errors::AgentError;
use crate::types::Delegation;

/// Shared context a handler works in for one turn.
#[derive(Clone)]
pub struct TurnContext {
    /// The conversation's shared state, threaded unchanged through every
    /// hand-off.
    pub session: SessionStore,
    /// Declared capabilities available to handlers.
    pub tools: std::sync::Arc<ToolRegistry>,
    /// Authenticated identity for the turn.
    pub acting_user_id: Option<String>,
    /// Cancellation token for the enclosing turn.
    pub cancellation: CancellationToken,
}

impl TurnContext {
    /// Build the context for one tool invocation.
    #[must_use]
    pub fn tool_context(&self) -> ToolContext {
        ToolContext::new(self.session.clone(), self.cancellation.clone())
    }
}

/// Input to one handler invocation.
#[derive(Clone, Debug)]
pub struct HandlerInput {
    /// The user's free-form content, identical at every depth.
    pub content: String,
    /// Structured payload: the request payload at the top, then whatever
    /// each delegation passed down.
    pub payload: Value,
}

/// What one handler invocation produced.
#[derive(Debug, Default)]
pub struct HandlerTurn {
    /// Output units, relayed to the caller in production order.
    pub outputs: Vec<OutputUnit>,
    /// Set when the turn continues in a sub-handler.
    pub delegation: Option<Delegation>,
}

impl HandlerTurn {
    /// A terminal result.
    #[must_use]
    pub fn terminal(outputs: Vec<OutputUnit>) -> Self {
        Self {
            outputs,
            delegation: None,
        }
    }

    /// A result that hands the turn to `handler_id`.
    #[must_use]
    pub fn delegate(
        outputs: Vec<OutputUnit>,
        handler_id: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            outputs,
            delegation: Some(Delegation {
                handler_id: handler_id.into(),
                payload,
            }),
        }
    }
}

/// A specialist unit of work.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Registered name, used as the delegation target.
    fn name(&self) -> &str;

    /// Short natural-language description of the work this handler
    /// performs; the router classifies against it.
    fn description(&self) -> &str;

    /// Handle one invocation.
    ///
    /// Errors are unrecoverable turn faults and propagate uncaught to the
    /// router's caller.
    async fn handle(&self, ctx: &TurnContext, input: HandlerInput)
    -> Result<HandlerTurn, AgentError>;
}
