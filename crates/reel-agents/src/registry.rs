//! Handler registry.
//!
//! Static index of specialist handlers, keyed by name. The router reads
//! the advertised capability descriptions; the runtime resolves delegation
//! targets here.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::handler::Handler;

/// Registry mapping handler names to implementations.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler. Overwrites any existing handler with the same
    /// name.
    pub fn register(&mut self, handler: Arc<dyn Handler>) {
        debug!(handler = handler.name(), "handler registered");
        let _ = self.handlers.insert(handler.name().to_owned(), handler);
    }

    /// Look up a handler by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }

    /// `(name, capability description)` for every registered handler,
    /// sorted by name for stable classification input.
    #[must_use]
    pub fn capabilities(&self) -> Vec<(String, String)> {
        let mut caps: Vec<(String, String)> = self
            .handlers
            .values()
            .map(|h| (h.name().to_owned(), h.description().to_owned()))
            .collect();
        caps.sort();
        caps
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.capabilities())
            .finish()
    }
}
