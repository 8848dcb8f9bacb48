//! Tool error types.

use thiserror::Error;

/// Errors raised by tool dispatch and execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The parameters did not match the tool's schema.
    #[error("invalid parameters for {tool}: {message}")]
    InvalidParams {
        /// Tool that rejected the parameters.
        tool: String,
        /// What was wrong.
        message: String,
    },

    /// No tool with the requested name is registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Session state access failed.
    #[error("{0}")]
    Session(#[from] reel_session::SessionError),
}

impl ToolError {
    /// Convenience constructor for parameter validation failures.
    #[must_use]
    pub fn invalid_params(tool: &str, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            tool: tool.to_owned(),
            message: message.into(),
        }
    }
}
