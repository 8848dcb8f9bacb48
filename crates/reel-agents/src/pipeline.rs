//! The planning pipeline: scene planner → prompt builder → renderer.
//!
//! Each stage consumes the structured payload handed down the delegation
//! chain, performs its work through the declared tools, and either ends
//! the turn or delegates to the next stage. The free-form creative content
//! inside the payload comes from an upstream reasoning component; these
//! handlers own the workflow mechanics only.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use reel_core::{OutputUnit, ScenePrompt};

use crate::errors::AgentError;
use crate::handler::{Handler, HandlerInput, HandlerTurn, TurnContext};

/// Structured payload threaded through the pipeline.
///
/// Every field is optional: a turn may plan only, plan and build prompts,
/// or go all the way to rendering.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PipelinePayload {
    /// Scene-label → summary for the breakdown stage.
    themes: Option<HashMap<String, String>>,
    /// Scene-label → structured prompt for the prompt stage.
    prompts: Option<BTreeMap<String, ScenePrompt>>,
    /// Whether to render after the prompts are saved.
    render: bool,
    /// Explicit scene mapping for the render stage; when absent the saved
    /// scene config is rendered.
    scenes: Option<BTreeMap<String, Value>>,
}

fn parse_payload(payload: &Value) -> Result<PipelinePayload, AgentError> {
    if payload.is_null() {
        return Ok(PipelinePayload::default());
    }
    serde_json::from_value(payload.clone()).map_err(|e| AgentError::Payload(e.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Scene planner
// ─────────────────────────────────────────────────────────────────────────────

/// Saves the scene breakdown, then hands off to prompt construction when
/// there is downstream work.
pub struct ScenePlannerHandler;

#[async_trait]
impl Handler for ScenePlannerHandler {
    fn name(&self) -> &str {
        "scene_planner"
    }

    fn description(&self) -> &str {
        "Breaks a film idea into per-scene themes and records them"
    }

    async fn handle(
        &self,
        ctx: &TurnContext,
        input: HandlerInput,
    ) -> Result<HandlerTurn, AgentError> {
        let payload = parse_payload(&input.payload)?;
        let mut outputs = Vec::new();

        if let Some(themes) = &payload.themes {
            let result = ctx
                .tools
                .dispatch(
                    "save_theme_list",
                    json!({ "themes": themes }),
                    &ctx.tool_context(),
                )
                .await?;
            outputs.push(OutputUnit::text(self.name(), result.content));
        } else {
            outputs.push(OutputUnit::text(
                self.name(),
                "no scene breakdown supplied, keeping the existing theme list",
            ));
        }

        let has_downstream =
            payload.prompts.is_some() || payload.render || payload.scenes.is_some();
        if has_downstream {
            Ok(HandlerTurn::delegate(
                outputs,
                "prompt_builder",
                input.payload,
            ))
        } else {
            Ok(HandlerTurn::terminal(outputs))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Prompt builder
// ─────────────────────────────────────────────────────────────────────────────

/// Upserts structured prompts per scene, then hands off to rendering when
/// requested.
pub struct PromptBuilderHandler;

#[async_trait]
impl Handler for PromptBuilderHandler {
    fn name(&self) -> &str {
        "prompt_builder"
    }

    fn description(&self) -> &str {
        "Turns scene themes into structured generation prompts"
    }

    async fn handle(
        &self,
        ctx: &TurnContext,
        input: HandlerInput,
    ) -> Result<HandlerTurn, AgentError> {
        let payload = parse_payload(&input.payload)?;
        let mut outputs = Vec::new();

        if let Some(prompts) = &payload.prompts {
            let mut saved = 0usize;
            for (label, prompt) in prompts {
                let _ = ctx
                    .tools
                    .dispatch(
                        "save_prompt_list",
                        json!({ "sceneLabel": label, "prompt": prompt }),
                        &ctx.tool_context(),
                    )
                    .await?;
                saved += 1;
            }
            outputs.push(OutputUnit::text(
                self.name(),
                format!("saved {saved} scene prompts"),
            ));
        }

        if payload.render || payload.scenes.is_some() {
            Ok(HandlerTurn::delegate(outputs, "renderer", input.payload))
        } else {
            Ok(HandlerTurn::terminal(outputs))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Drives the generation fan-out over the planned scenes and reports the
/// aggregate — partial failures included — back up the chain.
pub struct RendererHandler;

#[async_trait]
impl Handler for RendererHandler {
    fn name(&self) -> &str {
        "renderer"
    }

    fn description(&self) -> &str {
        "Sends planned scenes to the generation service and reports results"
    }

    async fn handle(
        &self,
        ctx: &TurnContext,
        input: HandlerInput,
    ) -> Result<HandlerTurn, AgentError> {
        let payload = parse_payload(&input.payload)?;
        let params = match payload.scenes {
            Some(scenes) => json!({ "scenes": scenes }),
            None => json!({}),
        };
        let result = ctx
            .tools
            .dispatch("send_to_generation_service", params, &ctx.tool_context())
            .await?;
        let unit = match result.data {
            Some(data) => OutputUnit::with_data(self.name(), result.content, data),
            None => OutputUnit::text(self.name(), result.content),
        };
        Ok(HandlerTurn::terminal(vec![unit]))
    }
}
