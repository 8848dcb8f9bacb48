//! `save_theme_list` — replace the session's scene theme map.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::errors::ToolError;
use crate::traits::{ReelTool, ToolContext, ToolDefinition, ToolOutput, ToolParameterSchema};

/// Tool name used for dispatch.
pub const NAME: &str = "save_theme_list";

#[derive(Debug, Deserialize)]
struct Params {
    themes: HashMap<String, String>,
}

/// Replaces the whole `theme_list` map (scene-label → summary) in session
/// state. Each save is a whole-value replace — stale labels from an earlier
/// breakdown do not linger.
pub struct SaveThemeList;

#[async_trait]
impl ReelTool for SaveThemeList {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Save the per-scene theme summaries planned for the film"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_owned(),
            description: self.description().to_owned(),
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: Some(json!({
                    "themes": {
                        "type": "object",
                        "description": "Scene label to one-line summary",
                        "additionalProperties": {"type": "string"}
                    }
                })),
                required: Some(vec!["themes".to_owned()]),
            },
        }
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let params: Params = serde_json::from_value(params)
            .map_err(|e| ToolError::invalid_params(NAME, e.to_string()))?;
        let count = params.themes.len();
        ctx.session.replace_theme_list(&params.themes)?;
        debug!(session_id = %ctx.session.session_id(), count, "theme list saved");
        Ok(ToolOutput::with_data(
            format!("saved {count} scene themes"),
            json!({ "count": count }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use reel_core::SessionId;
    use reel_session::SessionStore;

    use super::*;

    fn ctx() -> ToolContext {
        ToolContext::new(
            SessionStore::new(SessionId::from("s")),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn saves_and_replaces_whole_map() {
        let ctx = ctx();
        let first = json!({"themes": {"scene1": "dawn", "scene2": "noon"}});
        let _ = SaveThemeList.execute(first, &ctx).await.unwrap();

        let second = json!({"themes": {"scene1": "dusk"}});
        let output = SaveThemeList.execute(second, &ctx).await.unwrap();

        assert_eq!(output.content, "saved 1 scene themes");
        let themes = ctx.session.theme_list().unwrap();
        assert_eq!(themes.len(), 1);
        assert_eq!(themes["scene1"], "dusk");
    }

    #[tokio::test]
    async fn rejects_missing_themes_key() {
        let error = SaveThemeList
            .execute(json!({"wrong": {}}), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(error, ToolError::InvalidParams { .. }));
    }
}
