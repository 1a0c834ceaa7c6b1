//! Error types for the `docket-registry` crate.

use thiserror::Error;

/// Errors that can occur in registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The backing file could not be read or written.
    #[error("Registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized.
    #[error("Registry serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A convenience result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
