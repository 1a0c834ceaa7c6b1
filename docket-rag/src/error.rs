//! Error types for the `docket-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during document ingestion and retrieval.
#[derive(Debug, Error)]
pub enum RagError {
    /// The requested document type is not one of the supported formats.
    #[error("Unsupported document type: {0}")]
    UnsupportedDocumentType(String),

    /// The source file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The source file exists but could not be parsed.
    #[error("Load error ({format}): {message}")]
    Load {
        /// The document format that failed to parse.
        format: &'static str,
        /// A description of the failure.
        message: String,
    },

    /// The embedding service could not be reached or rejected the request.
    #[error("Embedding provider unavailable ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector store could not be reached or rejected the request.
    #[error("Vector store unavailable ({backend}): {message}")]
    Store {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during document chunking.
    #[error("Chunking error: {0}")]
    Chunking(String),

    /// Some batches of a file were committed before a batch failed.
    /// Committed batches are not rolled back.
    #[error(
        "Partial ingestion: batch {failed_batch} of {batch_count} failed \
         ({batches_committed} committed): {message}"
    )]
    PartialIngestion {
        /// Zero-based index of the batch that failed.
        failed_batch: usize,
        /// Total number of batches for the file.
        batch_count: usize,
        /// Number of batches durably written before the failure.
        batches_committed: usize,
        /// The underlying store or embedding failure.
        message: String,
    },

    /// A caller supplied an argument outside the accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
