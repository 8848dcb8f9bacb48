//! Tool registry — central index of all registered tools.
//!
//! The [`ToolRegistry`] maps tool names to their [`ReelTool`]
//! implementations. Handlers dispatch tool calls by name and can read the
//! advertised definitions to describe their capabilities.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::errors::ToolError;
use crate::traits::{ReelTool, ToolContext, ToolDefinition, ToolOutput};

/// Central registry mapping tool names to their implementations.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ReelTool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Overwrites any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn ReelTool>) {
        debug!(tool_name = tool.name(), "tool registered");
        let _ = self.tools.insert(tool.name().to_owned(), tool);
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ReelTool>> {
        self.tools.get(name).cloned()
    }

    /// Dispatch a call by tool name.
    pub async fn dispatch(
        &self,
        name: &str,
        params: Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_owned()))?;
        tool.execute(params, ctx).await
    }

    /// Return all tool definitions.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Return all tool names, sorted alphabetically.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Whether a tool with the given name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use reel_core::SessionId;
    use reel_session::SessionStore;

    use super::*;
    use crate::traits::ToolParameterSchema;

    /// Minimal stub tool for registry tests.
    struct StubTool {
        tool_name: String,
    }

    impl StubTool {
        fn new(name: &str) -> Self {
            Self {
                tool_name: name.into(),
            }
        }
    }

    #[async_trait]
    impl ReelTool for StubTool {
        fn name(&self) -> &str {
            &self.tool_name
        }

        fn description(&self) -> &str {
            "stub"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: self.tool_name.clone(),
                description: format!("Stub {}", self.tool_name),
                parameters: ToolParameterSchema {
                    schema_type: "object".into(),
                    properties: None,
                    required: None,
                },
            }
        }

        async fn execute(
            &self,
            _params: Value,
            _ctx: &ToolContext,
        ) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text("ok"))
        }
    }

    fn ctx() -> ToolContext {
        ToolContext::new(
            SessionStore::new(SessionId::from("s")),
            CancellationToken::new(),
        )
    }

    #[test]
    fn new_creates_empty_registry() {
        let reg = ToolRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn register_and_get() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("save_theme_list")));
        assert!(reg.get("save_theme_list").is_some());
        assert!(reg.get("unknown").is_none());
    }

    #[test]
    fn register_duplicate_overwrites() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("t")));
        reg.register(Arc::new(StubTool::new("t")));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn names_returns_sorted() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("send_to_generation_service")));
        reg.register(Arc::new(StubTool::new("save_theme_list")));
        reg.register(Arc::new(StubTool::new("save_prompt_list")));
        assert_eq!(
            reg.names(),
            vec![
                "save_prompt_list",
                "save_theme_list",
                "send_to_generation_service"
            ]
        );
    }

    #[test]
    fn definitions_returns_schemas() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("a")));
        reg.register(Arc::new(StubTool::new("b")));
        assert_eq!(reg.definitions().len(), 2);
    }

    #[tokio::test]
    async fn dispatch_runs_registered_tool() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("t")));
        let output = reg
            .dispatch("t", Value::Null, &ctx())
            .await
            .unwrap();
        assert_eq!(output.content, "ok");
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_is_an_error() {
        let reg = ToolRegistry::new();
        let error = reg.dispatch("nope", Value::Null, &ctx()).await.unwrap_err();
        assert!(matches!(error, ToolError::UnknownTool(name) if name == "nope"));
    }
}
