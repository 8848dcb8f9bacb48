//! The director — hierarchical workflow handler.
//!
//! Two states per turn: uninitialized → delegating. On entry it performs
//! the one-time session bootstrap (capturing the acting identity,
//! first-write-wins), then hands the entire turn to the inner pipeline.
//! Every output unit the pipeline produces is relayed by the runtime loop
//! unmodified and in order; faults from the pipeline are not caught here.

use async_trait::async_trait;
use tracing::debug;

use crate::errors::AgentError;
use crate::handler::{Handler, HandlerInput, HandlerTurn, TurnContext};

/// Name of the handler the director delegates the turn to.
pub const PIPELINE_ENTRY: &str = "scene_planner";

/// Bootstraps session identity, then delegates the whole turn to the
/// planning pipeline.
pub struct DirectorHandler;

#[async_trait]
impl Handler for DirectorHandler {
    fn name(&self) -> &str {
        "director"
    }

    fn description(&self) -> &str {
        "Plans and produces a multi-scene film: breakdown, prompt construction, rendering"
    }

    async fn handle(
        &self,
        ctx: &TurnContext,
        input: HandlerInput,
    ) -> Result<HandlerTurn, AgentError> {
        if let Some(user_id) = ctx.acting_user_id.as_deref() {
            let written = ctx.session.set_acting_user_once(user_id);
            if written {
                debug!(
                    session_id = %ctx.session.session_id(),
                    "acting identity captured for session"
                );
            }
        }
        Ok(HandlerTurn::delegate(Vec::new(), PIPELINE_ENTRY, input.payload))
    }
}
