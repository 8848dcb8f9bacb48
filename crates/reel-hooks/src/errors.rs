//! Hook error types.

use thiserror::Error;

/// Errors a hook handler may raise.
///
/// The engine treats every variant the same way: log and continue.
#[derive(Debug, Error)]
pub enum HookError {
    /// The hook could not read the state it inspects.
    #[error("hook state access failed: {0}")]
    State(#[from] reel_session::SessionError),

    /// Any other handler-specific failure.
    #[error("{0}")]
    Other(String),
}
