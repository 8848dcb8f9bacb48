//! Agent error types.
//!
//! An [`AgentError`] escaping a handler is an unrecoverable turn fault: it
//! propagates uncaught through the router to the host, which owns
//! session-level error reporting. Per-scene generation failures never
//! surface here — they live inside the render aggregate.

use thiserror::Error;

/// Unrecoverable turn-level failures.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A delegation named a handler that is not registered.
    #[error("no handler named {0:?} is registered")]
    UnknownHandler(String),

    /// A delegation chain exceeded the configured depth bound.
    #[error("delegation depth exceeded after {0} hops")]
    DelegationDepthExceeded(u32),

    /// The request payload did not match the shape a handler requires.
    #[error("invalid request payload: {0}")]
    Payload(String),

    /// A tool invocation failed.
    #[error("{0}")]
    Tool(#[from] reel_tools::ToolError),

    /// Session state access failed.
    #[error("{0}")]
    Session(#[from] reel_session::SessionError),
}
