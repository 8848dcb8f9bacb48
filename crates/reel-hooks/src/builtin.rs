//! Built-in hooks.

use async_trait::async_trait;
use tracing::debug;

use crate::errors::HookError;
use crate::handler::HookHandler;
use crate::types::HookContext;

/// Longest title captured from a user message, in characters.
const MAX_TITLE_CHARS: usize = 80;

/// Captures the first user message as the session title.
///
/// Runs only while the session's first-request flag is still set. The flag
/// is consumed together with the capture, so the pair happens exactly once
/// per session. When the turn carries no user message the flag is left
/// untouched and capture is retried on the next turn.
pub struct TitleCaptureHook;

#[async_trait]
impl HookHandler for TitleCaptureHook {
    fn name(&self) -> &str {
        "title-capture"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn description(&self) -> Option<&str> {
        Some("Captures the first user message as the session title")
    }

    async fn inspect(&self, context: &HookContext) -> Result<(), HookError> {
        let Some(message) = context.user_message.as_deref() else {
            return Ok(());
        };
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        if context.session.take_first_request() {
            let title: String = trimmed.chars().take(MAX_TITLE_CHARS).collect();
            let written = context.session.set_title_once(&title);
            debug!(
                session_id = %context.session.session_id(),
                written,
                "captured session title from first request"
            );
        }
        Ok(())
    }
}

/// Read-only inspector that logs turn identity at debug level.
///
/// Produces no state mutation and never affects the turn.
pub struct IdentityObserverHook;

#[async_trait]
impl HookHandler for IdentityObserverHook {
    fn name(&self) -> &str {
        "identity-observer"
    }

    fn description(&self) -> Option<&str> {
        Some("Logs the acting identity for the turn")
    }

    async fn inspect(&self, context: &HookContext) -> Result<(), HookError> {
        debug!(
            session_id = %context.session.session_id(),
            acting_user_id = context.acting_user_id.as_deref().unwrap_or("(none)"),
            has_user_message = context.user_message.is_some(),
            timestamp = %context.timestamp,
            "turn observed"
        );
        Ok(())
    }
}
