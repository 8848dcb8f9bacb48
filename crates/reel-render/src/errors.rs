//! Render error types.

use thiserror::Error;

/// Errors surfaced by the external generation service.
///
/// Any variant is terminal for the affected scene's job; it is recorded in
/// the aggregate outcome and never aborts sibling scenes.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Job submission was rejected or failed to reach the service.
    #[error("submit failed: {0}")]
    Submit(String),

    /// A completion poll failed.
    #[error("poll failed: {0}")]
    Poll(String),
}
