//! Hook registry.
//!
//! Maintains a priority-sorted collection of [`HookHandler`] instances.
//! The registry is the source of truth for which hooks are active and what
//! order they run in.

use std::sync::Arc;

use tracing::debug;

use crate::handler::HookHandler;

/// Registry of turn hooks, sorted by priority (descending).
#[derive(Default)]
pub struct HookRegistry {
    handlers: Vec<Arc<dyn HookHandler>>,
}

impl HookRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Create a registry with the built-in hooks installed.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(crate::builtin::TitleCaptureHook));
        registry.register(Arc::new(crate::builtin::IdentityObserverHook));
        registry
    }

    /// Register a hook handler.
    ///
    /// If a handler with the same name already exists, it is replaced. The
    /// collection is re-sorted by priority (descending) after insertion.
    pub fn register(&mut self, handler: Arc<dyn HookHandler>) {
        let name = handler.name().to_owned();
        self.handlers.retain(|h| h.name() != name);
        debug!(name = %name, priority = handler.priority(), "registering hook");
        self.handlers.push(handler);
        self.handlers.sort_by_key(|h| std::cmp::Reverse(h.priority()));
    }

    /// Unregister a handler by name. Returns `true` if one was removed.
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|h| h.name() != name);
        self.handlers.len() < before
    }

    /// Handlers in execution order (priority descending).
    #[must_use]
    pub fn handlers(&self) -> &[Arc<dyn HookHandler>] {
        &self.handlers
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.handlers.len()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hook_count", &self.count())
            .finish()
    }
}
