//! Hook context.

use chrono::Utc;

use reel_session::SessionStore;

/// What a hook sees when a turn begins.
///
/// Hooks receive the session store handle plus turn metadata. They may
/// mutate session state through the store's contracts (the title-capture
/// hook does), but they never influence control flow.
#[derive(Clone, Debug)]
pub struct HookContext {
    /// The conversation's shared state.
    pub session: SessionStore,
    /// Most recent user-authored message, when one exists.
    pub user_message: Option<String>,
    /// Authenticated identity carried by this turn's invocation.
    pub acting_user_id: Option<String>,
    /// ISO 8601 timestamp for when the turn started.
    pub timestamp: String,
}

impl HookContext {
    /// Build a context for the current instant.
    #[must_use]
    pub fn new(
        session: SessionStore,
        user_message: Option<String>,
        acting_user_id: Option<String>,
    ) -> Self {
        Self {
            session,
            user_message,
            acting_user_id,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
