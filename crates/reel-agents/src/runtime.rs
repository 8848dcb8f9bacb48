//! The turn runtime — the callable the hosting runtime drives.
//!
//! One call per turn: run the callback hooks, route the request onto
//! exactly one handler (or answer directly), then execute the resulting
//! delegation chain as explicit message passing, relaying every output
//! unit in production order. The session store is threaded unchanged the
//! whole way down; the host persists its snapshot after the turn.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use reel_core::OutputUnit;
use reel_hooks::{HookContext, HookEngine};
use reel_render::{GenerationService, RenderConfig, RenderEngine};
use reel_session::SessionStore;
use reel_settings::ReelSettings;
use reel_tools::{SavePromptList, SaveThemeList, SendToGenerationService, ToolRegistry};

use crate::classifier::KeywordClassifier;
use crate::director::DirectorHandler;
use crate::errors::AgentError;
use crate::handler::{HandlerInput, TurnContext};
use crate::pipeline::{PromptBuilderHandler, RendererHandler, ScenePlannerHandler};
use crate::registry::HandlerRegistry;
use crate::router::{Routed, SupervisorRouter};
use crate::types::TurnRequest;

/// Per-turn entry point over the router, hooks, and tools.
pub struct Runtime {
    router: SupervisorRouter,
    hooks: HookEngine,
    tools: Arc<ToolRegistry>,
    max_delegation_depth: u32,
}

impl Runtime {
    /// Assemble a runtime from its parts.
    #[must_use]
    pub fn new(
        router: SupervisorRouter,
        hooks: HookEngine,
        tools: Arc<ToolRegistry>,
        max_delegation_depth: u32,
    ) -> Self {
        Self {
            router,
            hooks,
            tools,
            max_delegation_depth,
        }
    }

    /// Wire the built-in media workflow over a generation service.
    ///
    /// Registers the three workflow tools, the director and its pipeline
    /// handlers, the keyword classifier, and the built-in hooks.
    #[must_use]
    pub fn for_media_workflow(
        service: Arc<dyn GenerationService>,
        settings: &ReelSettings,
    ) -> Self {
        let engine = Arc::new(RenderEngine::new(
            service,
            RenderConfig::from_settings(&settings.render),
        ));

        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(SaveThemeList));
        tools.register(Arc::new(SavePromptList));
        tools.register(Arc::new(SendToGenerationService::new(engine)));

        let mut handlers = HandlerRegistry::new();
        handlers.register(Arc::new(DirectorHandler));
        handlers.register(Arc::new(ScenePlannerHandler));
        handlers.register(Arc::new(PromptBuilderHandler));
        handlers.register(Arc::new(RendererHandler));

        Self::new(
            SupervisorRouter::new(
                handlers,
                Box::new(KeywordClassifier::for_media_workflow()),
            ),
            HookEngine::with_builtins(),
            Arc::new(tools),
            settings.agent.max_delegation_depth,
        )
    }

    /// Run one turn with a fresh cancellation token.
    pub async fn run_turn(
        &self,
        session: &SessionStore,
        request: TurnRequest,
    ) -> Result<Vec<OutputUnit>, AgentError> {
        self.run_turn_with_cancel(session, request, &CancellationToken::new())
            .await
    }

    /// Run one turn under the host's cancellation token.
    ///
    /// Cancelling the token cancels every outstanding per-scene generation
    /// task; no partial `movie_urls` append happens for a job that had not
    /// reached a terminal state.
    pub async fn run_turn_with_cancel(
        &self,
        session: &SessionStore,
        request: TurnRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<OutputUnit>, AgentError> {
        self.hooks
            .run_before_turn(&HookContext::new(
                session.clone(),
                Some(request.content.clone()),
                request.acting_user_id.clone(),
            ))
            .await;

        let ctx = TurnContext {
            session: session.clone(),
            tools: Arc::clone(&self.tools),
            acting_user_id: request.acting_user_id.clone(),
            cancellation: cancel.clone(),
        };

        let mut outputs: Vec<OutputUnit> = Vec::new();
        let mut delegation = match self.router.route(&ctx, &request).await? {
            Routed::Direct(turn) => {
                outputs.extend(turn.outputs);
                None
            }
            Routed::Delegated { turn, .. } => {
                outputs.extend(turn.outputs);
                turn.delegation
            }
        };

        let mut depth: u32 = 0;
        while let Some(next) = delegation {
            depth += 1;
            if depth > self.max_delegation_depth {
                return Err(AgentError::DelegationDepthExceeded(depth));
            }
            let handler = self
                .router
                .registry()
                .get(&next.handler_id)
                .ok_or_else(|| AgentError::UnknownHandler(next.handler_id.clone()))?;
            debug!(handler = %next.handler_id, depth, "executing delegation");
            let turn = handler
                .handle(
                    &ctx,
                    HandlerInput {
                        content: request.content.clone(),
                        payload: next.payload,
                    },
                )
                .await?;
            outputs.extend(turn.outputs);
            delegation = turn.delegation;
        }

        Ok(outputs)
    }
}
