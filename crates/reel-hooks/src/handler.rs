//! Hook handler trait.
//!
//! Defines the [`HookHandler`] trait that all hook implementations must
//! satisfy. Handlers are registered with the
//! [`HookRegistry`](crate::registry::HookRegistry) and executed by the
//! [`HookEngine`](crate::engine::HookEngine) before each turn's reasoning
//! step.

use async_trait::async_trait;

use crate::errors::HookError;
use crate::types::HookContext;

/// A per-turn inspector.
///
/// # Priority
///
/// Higher priority handlers run first. Default priority is 0.
///
/// # Fail-open
///
/// Errors are caught by the engine, logged, and skipped — a hook can never
/// fail or block the turn it observes.
#[async_trait]
pub trait HookHandler: Send + Sync {
    /// Unique name for this handler.
    fn name(&self) -> &str;

    /// Execution priority. Higher runs first. Default: 0.
    fn priority(&self) -> i32 {
        0
    }

    /// Optional human-readable description.
    fn description(&self) -> Option<&str> {
        None
    }

    /// Inspect the turn. Must tolerate absent or malformed input.
    async fn inspect(&self, context: &HookContext) -> Result<(), HookError>;
}
