//! Hook execution engine.
//!
//! Runs registered hooks in priority order before each turn's reasoning
//! step.
//!
//! # Fail-Open
//!
//! Hook errors never reach the turn. They are logged at warn level and the
//! remaining hooks still run. Hooks cannot block or modify the turn — they
//! are inspectors only.

use std::time::Instant;

use tracing::{debug, warn};

use crate::registry::HookRegistry;
use crate::types::HookContext;

/// Hook execution engine.
///
/// Owns the [`HookRegistry`] and drives every registered inspector once
/// per turn.
pub struct HookEngine {
    registry: HookRegistry,
}

impl HookEngine {
    /// Create a new engine with the given registry.
    #[must_use]
    pub fn new(registry: HookRegistry) -> Self {
        Self { registry }
    }

    /// Create an engine with the built-in hooks installed.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::new(HookRegistry::with_builtins())
    }

    /// Run every registered hook against the turn context.
    ///
    /// Handlers run sequentially in priority order; a failing handler is
    /// logged and skipped.
    pub async fn run_before_turn(&self, context: &HookContext) {
        let start = Instant::now();
        for handler in self.registry.handlers() {
            if let Err(error) = handler.inspect(context).await {
                warn!(
                    name = %handler.name(),
                    error = %error,
                    "hook failed, continuing"
                );
            }
        }
        debug!(
            hooks = self.registry.count(),
            duration_ms = start.elapsed().as_millis(),
            "turn hooks complete"
        );
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }
}
