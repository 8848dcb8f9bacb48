//! `save_prompt_list` — upsert one scene's structured prompt.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use reel_core::{ScenePrompt, scene};

use crate::errors::ToolError;
use crate::traits::{ReelTool, ToolContext, ToolDefinition, ToolOutput, ToolParameterSchema};

/// Tool name used for dispatch.
pub const NAME: &str = "save_prompt_list";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Params {
    scene_label: String,
    prompt: ScenePrompt,
}

/// Upserts one scene's [`ScenePrompt`] under `scene_config`, keyed by the
/// canonical form of the supplied label. A fallback label (no recoverable
/// number) is used as-is — non-fatal, the normalizer already logged it.
pub struct SavePromptList;

#[async_trait]
impl ReelTool for SavePromptList {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Save one scene's structured generation prompt"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_owned(),
            description: self.description().to_owned(),
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: Some(json!({
                    "sceneLabel": {
                        "type": "string",
                        "description": "Scene label in any spelling; canonicalized to scene<N>"
                    },
                    "prompt": {
                        "type": "object",
                        "description": "Structured prompt blueprint for the scene"
                    }
                })),
                required: Some(vec!["sceneLabel".to_owned(), "prompt".to_owned()]),
            },
        }
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let params: Params = serde_json::from_value(params)
            .map_err(|e| ToolError::invalid_params(NAME, e.to_string()))?;
        let normalized = scene::normalize(&params.scene_label);
        let scene_id = normalized.as_str().to_owned();
        ctx.session.upsert_scene_prompt(&scene_id, &params.prompt)?;
        debug!(
            session_id = %ctx.session.session_id(),
            scene_id = %scene_id,
            fallback = normalized.is_fallback(),
            "scene prompt saved"
        );
        Ok(ToolOutput::with_data(
            format!("saved prompt for {scene_id}"),
            json!({ "sceneId": scene_id, "fallbackLabel": normalized.is_fallback() }),
        ))
    }
}
