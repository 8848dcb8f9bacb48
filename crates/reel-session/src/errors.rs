//! Session store error types.

use thiserror::Error;

/// Errors raised by typed session state accessors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A well-known key held a value that does not deserialize to its
    /// expected shape.
    #[error("session key {key:?} holds a malformed value: {source}")]
    Malformed {
        /// The state key that was read.
        key: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be serialized for storage.
    #[error("failed to serialize value for session key {key:?}: {source}")]
    Serialize {
        /// The state key being written.
        key: String,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
}
