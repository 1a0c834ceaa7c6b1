//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and the character-window
//! [`FixedSizeChunker`]. The embedding-driven
//! [`SemanticChunker`](crate::semantic::SemanticChunker) lives in its own
//! module since it needs a live embedding provider.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::document::{Chunk, PageSegment};
use crate::error::Result;

/// A strategy for splitting page segments into retrieval-sized chunks.
///
/// Implementations produce [`Chunk`]s with text and provenance metadata but
/// no embeddings; embeddings are attached later by the pipeline. Chunk
/// boundaries never cross segment (page) boundaries.
#[async_trait]
pub trait Chunker: Send + Sync {
    /// Split segments into chunks, in reading order.
    async fn split(&self, segments: &[PageSegment]) -> Result<Vec<Chunk>>;
}

/// Build a chunk for `text` cut from `segment`, tagged with its running
/// index within the file.
pub(crate) fn make_chunk(segment: &PageSegment, text: String, chunk_index: usize) -> Chunk {
    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), segment.source_path.clone());
    metadata.insert("page".to_string(), segment.page_number.to_string());
    metadata.insert("chunk_index".to_string(), chunk_index.to_string());

    Chunk {
        id: Uuid::new_v4().to_string(),
        text,
        embedding: Vec::new(),
        metadata,
        source: segment.source_path.clone(),
    }
}

/// Splits text into fixed-size chunks by character count with configurable
/// overlap.
///
/// Consecutive chunks from the same segment share exactly
/// `min(chunk_overlap, previous chunk length)` characters. Chunk text is
/// deterministic given the same input.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Default maximum characters per chunk.
    pub const DEFAULT_CHUNK_SIZE: usize = 750;
    /// Default characters shared between consecutive chunks.
    pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between
    ///   consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Character windows over one segment. Windows advance by
    /// `chunk_size - chunk_overlap` and the last window stops at the end of
    /// the segment.
    fn split_text(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let step = self.chunk_size.saturating_sub(self.chunk_overlap);
        let mut pieces = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            pieces.push(chars[start..end].iter().collect());
            if end == chars.len() || step == 0 {
                break;
            }
            start += step;
        }

        pieces
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHUNK_SIZE, Self::DEFAULT_CHUNK_OVERLAP)
    }
}

#[async_trait]
impl Chunker for FixedSizeChunker {
    async fn split(&self, segments: &[PageSegment]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        let mut chunk_index = 0;

        for segment in segments {
            for text in self.split_text(&segment.text) {
                chunks.push(make_chunk(segment, text, chunk_index));
                chunk_index += 1;
            }
        }

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, page: u32) -> PageSegment {
        PageSegment {
            text: text.to_string(),
            page_number: page,
            source_path: "report.pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn chunks_never_exceed_chunk_size() {
        let chunker = FixedSizeChunker::new(750, 100);
        let text = "x".repeat(5000);
        let chunks = chunker.split(&[segment(&text, 1)]).await.unwrap();

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 750);
        }
    }

    #[tokio::test]
    async fn adjacent_chunks_overlap_exactly() {
        let chunker = FixedSizeChunker::new(750, 100);
        // Distinct characters so overlap comparison is meaningful.
        let text: String = (0..2000u32)
            .map(|i| char::from_u32('a' as u32 + (i % 26)).unwrap())
            .collect();
        let chunks = chunker.split(&[segment(&text, 1)]).await.unwrap();

        for pair in chunks.windows(2) {
            let first: Vec<char> = pair[0].text.chars().collect();
            let second: Vec<char> = pair[1].text.chars().collect();
            let overlap = 100.min(first.len());
            let tail: String = first[first.len() - overlap..].iter().collect();
            let head: String = second[..overlap].iter().collect();
            assert_eq!(tail, head);
        }
    }

    #[tokio::test]
    async fn chunks_do_not_cross_page_boundaries() {
        let chunker = FixedSizeChunker::new(750, 100);
        let segments =
            vec![segment(&"a".repeat(800), 1), segment(&"b".repeat(800), 2)];
        let chunks = chunker.split(&segments).await.unwrap();

        for chunk in &chunks {
            let has_a = chunk.text.contains('a');
            let has_b = chunk.text.contains('b');
            assert!(!(has_a && has_b), "chunk mixes text from two pages");
        }
    }

    #[tokio::test]
    async fn short_segment_yields_single_chunk() {
        let chunker = FixedSizeChunker::default();
        let chunks = chunker.split(&[segment("short text", 3)]).await.unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short text");
        assert_eq!(chunks[0].metadata["page"], "3");
        assert_eq!(chunks[0].metadata["chunk_index"], "0");
        assert_eq!(chunks[0].source, "report.pdf");
    }

    #[tokio::test]
    async fn empty_segments_yield_no_chunks() {
        let chunker = FixedSizeChunker::default();
        let chunks = chunker.split(&[segment("", 1)]).await.unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn chunk_index_runs_across_pages() {
        let chunker = FixedSizeChunker::new(750, 100);
        let segments = vec![segment("page one", 1), segment("page two", 2)];
        let chunks = chunker.split(&segments).await.unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata["chunk_index"], "0");
        assert_eq!(chunks[1].metadata["chunk_index"], "1");
    }
}
