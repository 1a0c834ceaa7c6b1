//! Error types for the `docket-session` crate.

use thiserror::Error;

/// Errors that can occur in chat-history persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backing file could not be read or written.
    #[error("Session I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A message could not be serialized.
    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A convenience result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
