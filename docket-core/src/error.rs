//! Error types shared across the docket crates.

use thiserror::Error;

/// Errors surfaced at the agent/service boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A tool invocation failed. Downstream failures are flattened into this
    /// variant so nothing crosses the agent boundary as a panic.
    #[error("Tool error: {0}")]
    Tool(String),

    /// A caller supplied an argument outside the accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An unanticipated internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A convenience result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
