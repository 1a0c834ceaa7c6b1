//! Embedding-driven semantic chunking.
//!
//! Splits text where the topic shifts: sentences are embedded through the
//! live [`EmbeddingProvider`], and a boundary is placed wherever the cosine
//! distance between adjacent sentences exceeds a percentile threshold
//! computed over the whole segment. Output is deterministic for a fixed
//! provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::chunking::{Chunker, make_chunk};
use crate::document::{Chunk, PageSegment};
use crate::embedding::{EmbeddingProvider, cosine_similarity};
use crate::error::Result;

/// Splits at semantic boundaries derived from sentence-embedding distances.
///
/// Requires a reachable embedding provider; provider failures surface as
/// [`RagError::Embedding`](crate::RagError::Embedding). Segments are chunked
/// independently, so boundaries never cross pages.
pub struct SemanticChunker {
    embedder: Arc<dyn EmbeddingProvider>,
    breakpoint_percentile: f64,
}

impl SemanticChunker {
    /// Percentile of adjacent-sentence distances above which a boundary is
    /// placed.
    pub const DEFAULT_BREAKPOINT_PERCENTILE: f64 = 95.0;

    /// Create a new semantic chunker backed by the given provider.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder, breakpoint_percentile: Self::DEFAULT_BREAKPOINT_PERCENTILE }
    }

    /// Override the breakpoint percentile (clamped to `0.0..=100.0`).
    pub fn with_breakpoint_percentile(mut self, percentile: f64) -> Self {
        self.breakpoint_percentile = percentile.clamp(0.0, 100.0);
        self
    }

    /// Split one segment's text into semantically coherent spans.
    async fn split_text(&self, text: &str) -> Result<Vec<String>> {
        let sentences: Vec<&str> =
            text.unicode_sentences().filter(|s| !s.trim().is_empty()).collect();

        if sentences.len() <= 1 {
            let trimmed = text.trim();
            return Ok(if trimmed.is_empty() { Vec::new() } else { vec![trimmed.to_string()] });
        }

        let embeddings = self.embedder.embed_batch(&sentences).await?;

        // Distance between each sentence and its successor.
        let distances: Vec<f64> = embeddings
            .windows(2)
            .map(|pair| 1.0 - f64::from(cosine_similarity(&pair[0], &pair[1])))
            .collect();

        let threshold = percentile(&distances, self.breakpoint_percentile);
        debug!(
            sentence_count = sentences.len(),
            threshold,
            "computed semantic breakpoint threshold"
        );

        let mut spans = Vec::new();
        let mut start = 0;
        for (i, distance) in distances.iter().enumerate() {
            if *distance > threshold {
                spans.push(join_sentences(&sentences[start..=i]));
                start = i + 1;
            }
        }
        spans.push(join_sentences(&sentences[start..]));

        Ok(spans.into_iter().filter(|s| !s.is_empty()).collect())
    }
}

/// Concatenate sentence slices back into a span, trimming the edges.
fn join_sentences(sentences: &[&str]) -> String {
    sentences.concat().trim().to_string()
}

/// Linear-interpolation percentile over an unsorted sample.
fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let frac = rank - lower as f64;
    sorted[lower] + frac * (sorted[upper] - sorted[lower])
}

#[async_trait]
impl Chunker for SemanticChunker {
    async fn split(&self, segments: &[PageSegment]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        let mut chunk_index = 0;

        for segment in segments {
            for text in self.split_text(&segment.text).await? {
                chunks.push(make_chunk(segment, text, chunk_index));
                chunk_index += 1;
            }
        }

        Ok(chunks)
    }
}
