//! Data types for page segments, chunks, and search results.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RagError;

/// Identifies one of the two ingestion pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineId {
    /// Fixed-size chunking into the dimension-fixed store.
    A,
    /// Semantic chunking into the schema-flexible store.
    B,
}

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineId::A => f.write_str("A"),
            PipelineId::B => f.write_str("B"),
        }
    }
}

impl FromStr for PipelineId {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "a" => Ok(PipelineId::A),
            "B" | "b" => Ok(PipelineId::B),
            other => Err(RagError::InvalidArgument(format!(
                "invalid pipeline: '{other}' (use 'A' or 'B')"
            ))),
        }
    }
}

/// A page-level span of text produced by the document loader.
///
/// Segments are an intermediate shape: they are consumed by a
/// [`Chunker`](crate::chunking::Chunker) and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSegment {
    /// The extracted text of the page.
    pub text: String,
    /// One-based page number. DOCX files yield a single segment with page 1.
    pub page_number: u32,
    /// Path of the source file the segment came from.
    pub source_path: String,
}

/// A retrieval-sized span of text with its vector embedding.
///
/// The unit stored in and returned by a vector store. Metadata carries
/// `source`, `page`, `pipeline`, and `chunk_index` entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier (UUIDv4 string, valid as a Qdrant point ID).
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text. Empty until the
    /// pipeline attaches one.
    pub embedding: Vec<f32>,
    /// Key-value metadata describing the chunk's provenance.
    pub metadata: HashMap<String, String>,
    /// Identifier of the source file the chunk was cut from.
    pub source: String,
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}

/// The outcome of one ingestion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionResult {
    /// Which pipeline processed the file.
    pub pipeline: PipelineId,
    /// Generated file description. Pipeline B produces none, and pipeline A
    /// degrades to `None` when description generation fails.
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_id_round_trips_through_display() {
        assert_eq!("A".parse::<PipelineId>().unwrap().to_string(), "A");
        assert_eq!("b".parse::<PipelineId>().unwrap().to_string(), "B");
    }

    #[test]
    fn pipeline_id_rejects_other_values() {
        let err = "C".parse::<PipelineId>().unwrap_err();
        assert!(matches!(err, RagError::InvalidArgument(_)));
    }
}
