//! `send_to_generation_service` — fan the scene specs out for rendering.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use reel_core::scene;
use reel_render::{JobSpec, RenderEngine};

use crate::errors::ToolError;
use crate::traits::{ReelTool, ToolContext, ToolDefinition, ToolOutput, ToolParameterSchema};

/// Tool name used for dispatch.
pub const NAME: &str = "send_to_generation_service";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Params {
    /// Optional explicit scene → prompt payload mapping. When absent, the
    /// session's accumulated `scene_config` is rendered.
    scenes: Option<BTreeMap<String, Value>>,
}

/// Submits one generation job per scene and waits for all of them.
///
/// The scene mapping comes from the call parameters when given, otherwise
/// from the session's accumulated `scene_config`. Labels are canonicalized
/// before submission so re-renders hit the same `movie_urls` history. The
/// aggregate outcome — including every per-scene failure — is returned as
/// structured data; partial success is still an overall success.
pub struct SendToGenerationService {
    engine: Arc<RenderEngine>,
}

impl SendToGenerationService {
    /// Create the tool over a configured engine.
    #[must_use]
    pub fn new(engine: Arc<RenderEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl ReelTool for SendToGenerationService {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Render every planned scene with the external generation service"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_owned(),
            description: self.description().to_owned(),
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: Some(json!({
                    "scenes": {
                        "type": "object",
                        "description": "Scene label to prompt payload; omit to render the saved scene config",
                        "additionalProperties": {"type": "object"}
                    }
                })),
                required: None,
            },
        }
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let params: Params = serde_json::from_value(params)
            .map_err(|e| ToolError::invalid_params(NAME, e.to_string()))?;

        // Canonical id → job, so duplicate labels collapse to one scene.
        let mut jobs: BTreeMap<String, JobSpec> = BTreeMap::new();

        match params.scenes {
            Some(scenes) if !scenes.is_empty() => {
                for (label, payload) in scenes {
                    let scene_id = scene::normalize(&label).into_id();
                    let reference_image_uri = reference_from_payload(&payload);
                    let _ = jobs.insert(
                        scene_id.clone(),
                        JobSpec {
                            scene_id,
                            prompt_payload: payload,
                            reference_image_uri,
                        },
                    );
                }
            }
            _ => {
                for (scene_id, prompt) in ctx.session.scene_config()? {
                    let reference_image_uri = prompt.image_url.clone();
                    let payload = serde_json::to_value(&prompt)
                        .map_err(|e| ToolError::invalid_params(NAME, e.to_string()))?;
                    let _ = jobs.insert(
                        scene_id.clone(),
                        JobSpec {
                            scene_id,
                            prompt_payload: payload,
                            reference_image_uri,
                        },
                    );
                }
            }
        }

        if jobs.is_empty() {
            return Err(ToolError::invalid_params(
                NAME,
                "no scenes to render: provide a scene mapping or save prompts first",
            ));
        }

        info!(
            session_id = %ctx.session.session_id(),
            scenes = jobs.len(),
            "dispatching generation fan-out"
        );
        let outcome = self
            .engine
            .render_all(
                jobs.into_values().collect(),
                &ctx.session,
                &ctx.cancellation,
            )
            .await;

        let message = outcome.message.clone();
        let data = serde_json::to_value(&outcome)
            .map_err(|e| ToolError::invalid_params(NAME, e.to_string()))?;
        Ok(ToolOutput::with_data(message, data))
    }
}

/// Pull a reference image out of a prompt payload, if one is declared.
fn reference_from_payload(payload: &Value) -> Option<String> {
    for key in ["referenceImageUri", "imageUrl"] {
        if let Some(Value::String(uri)) = payload.get(key) {
            if !uri.is_empty() {
                return Some(uri.clone());
            }
        }
    }
    None
}
