//! The supervisor router.
//!
//! Receives one request plus the session, consults the handler registry's
//! capability descriptions through a pluggable [`Classifier`], and forwards
//! the request to exactly one specialist — never more than one, never a
//! fallback chain. When no specialist matches, the router itself produces
//! a direct response.

use tracing::{debug, info};

use reel_core::OutputUnit;

use crate::classifier::Classifier;
use crate::errors::AgentError;
use crate::handler::{HandlerInput, HandlerTurn, TurnContext};
use crate::registry::HandlerRegistry;
use crate::types::TurnRequest;

/// Name the router reports on its own direct responses.
pub const SUPERVISOR: &str = "supervisor";

/// The router's decision for one request.
#[derive(Debug)]
pub enum Routed {
    /// Exactly one specialist was chosen and invoked; its result follows.
    Delegated {
        /// The chosen handler's name.
        handler_id: String,
        /// The handler's result, unmodified.
        turn: HandlerTurn,
    },
    /// No specialist matched; the router answered directly.
    Direct(HandlerTurn),
}

/// Classifies inbound requests onto exactly one specialist handler.
pub struct SupervisorRouter {
    registry: HandlerRegistry,
    classifier: Box<dyn Classifier>,
}

impl SupervisorRouter {
    /// Create a router over a handler registry and classifier.
    #[must_use]
    pub fn new(registry: HandlerRegistry, classifier: Box<dyn Classifier>) -> Self {
        Self {
            registry,
            classifier,
        }
    }

    /// The handler registry (delegation targets resolve here too).
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Route one request.
    ///
    /// The session inside `ctx` is threaded into the chosen handler
    /// unchanged. Handler faults propagate uncaught.
    pub async fn route(
        &self,
        ctx: &TurnContext,
        request: &TurnRequest,
    ) -> Result<Routed, AgentError> {
        match self.classifier.classify(request, &self.registry) {
            Some(handler_id) => {
                let handler = self
                    .registry
                    .get(&handler_id)
                    .ok_or_else(|| AgentError::UnknownHandler(handler_id.clone()))?;
                info!(handler = %handler_id, "request delegated");
                let turn = handler
                    .handle(
                        ctx,
                        HandlerInput {
                            content: request.content.clone(),
                            payload: request.payload.clone(),
                        },
                    )
                    .await?;
                Ok(Routed::Delegated { handler_id, turn })
            }
            None => {
                debug!("no specialist matched, answering directly");
                Ok(Routed::Direct(HandlerTurn::terminal(vec![
                    OutputUnit::text(
                        SUPERVISOR,
                        "I coordinate film planning and rendering. Describe the movie you \
                         want to make, or ask to render the scenes you have planned.",
                    ),
                ])))
            }
        }
    }
}
