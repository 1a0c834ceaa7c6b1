//! The dual-pipeline knowledge base: ingestion routing and query fan-out.

use std::path::Path;
use std::sync::Arc;

use docket_core::DocumentType;
use tracing::{info, warn};

use crate::chunking::FixedSizeChunker;
use crate::config::RagConfig;
use crate::document::{IngestionResult, PipelineId, SearchResult};
use crate::error::{RagError, Result};
use crate::loader::FileDocumentLoader;
use crate::pipeline::IngestionPipeline;

/// Collection backing pipeline A (Qdrant, eagerly created).
pub const COLLECTION_A: &str = "demo_collection";

/// Collection backing pipeline B (pgvector, created on first upsert).
pub const COLLECTION_B: &str = "default_collection";

/// Chunks per embed/upsert request on pipeline A.
pub const BATCH_SIZE_A: usize = 16;

/// Two independent ingestion pipelines behind one ingest/search surface.
///
/// Queries fan out to both pipelines concurrently and the result lists are
/// concatenated A-then-B, each preserving its own ranking; there is no
/// global re-rank across pipelines. A pipeline that fails during a query
/// degrades the response to the other pipeline's results; the query only
/// errors when both sides fail.
pub struct KnowledgeBase {
    pipeline_a: Arc<IngestionPipeline>,
    pipeline_b: Arc<IngestionPipeline>,
    config: RagConfig,
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase").field("config", &self.config).finish_non_exhaustive()
    }
}

impl KnowledgeBase {
    /// Create a knowledge base from two fully built pipelines, with default
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] unless the pipelines are tagged
    /// [`PipelineId::A`] and [`PipelineId::B`] respectively.
    pub fn new(
        pipeline_a: Arc<IngestionPipeline>,
        pipeline_b: Arc<IngestionPipeline>,
    ) -> Result<Self> {
        if pipeline_a.id() != PipelineId::A || pipeline_b.id() != PipelineId::B {
            return Err(RagError::Config(
                "knowledge base requires pipeline A and pipeline B, in that order".to_string(),
            ));
        }
        Ok(Self { pipeline_a, pipeline_b, config: RagConfig::default() })
    }

    /// Replace the configuration (retrieval defaults).
    pub fn with_config(mut self, config: RagConfig) -> Self {
        self.config = config;
        self
    }

    /// The knowledge base configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Build the production configuration from the environment:
    /// Azure OpenAI embeddings + Qdrant with fixed-size chunking on A,
    /// NVIDIA embeddings + pgvector with semantic chunking on B.
    ///
    /// Pipeline A's collection is created eagerly here; pipeline B's store
    /// creates its table on first upsert. A missing describer configuration
    /// is tolerated; descriptions then degrade to `None`.
    pub async fn from_env() -> Result<Self> {
        use crate::azure::AzureEmbeddingProvider;
        use crate::describe::OpenAiDescriber;
        use crate::nvidia::NvidiaEmbeddingProvider;
        use crate::pgvector::PgVectorStore;
        use crate::qdrant::QdrantVectorStore;
        use crate::semantic::SemanticChunker;

        let config = RagConfig::default();
        let loader = Arc::new(FileDocumentLoader::new());

        let embedder_a = Arc::new(AzureEmbeddingProvider::from_env()?);
        let store_a = Arc::new(QdrantVectorStore::from_env()?);

        let mut builder_a = IngestionPipeline::builder()
            .id(PipelineId::A)
            .collection(COLLECTION_A)
            .batch_size(BATCH_SIZE_A)
            .loader(loader.clone())
            .chunker(Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)))
            .embedder(embedder_a)
            .store(store_a);

        match OpenAiDescriber::from_env() {
            Ok(describer) => builder_a = builder_a.describer(Arc::new(describer)),
            Err(e) => warn!(error = %e, "describer not configured, descriptions disabled"),
        }

        let embedder_b = Arc::new(NvidiaEmbeddingProvider::from_env()?);
        let store_b = Arc::new(PgVectorStore::from_env().await?);

        let pipeline_b = IngestionPipeline::builder()
            .id(PipelineId::B)
            .collection(COLLECTION_B)
            .loader(loader)
            .chunker(Arc::new(SemanticChunker::new(embedder_b.clone())))
            .embedder(embedder_b)
            .store(store_b)
            .build()?;

        let pipeline_a = builder_a.build()?;
        pipeline_a.bootstrap().await?;

        Ok(Self::new(Arc::new(pipeline_a), Arc::new(pipeline_b))?.with_config(config))
    }

    /// The pipeline registered under `id`.
    pub fn pipeline(&self, id: PipelineId) -> &Arc<IngestionPipeline> {
        match id {
            PipelineId::A => &self.pipeline_a,
            PipelineId::B => &self.pipeline_b,
        }
    }

    /// Ingest a file through the selected pipeline.
    pub async fn ingest_file(
        &self,
        path: &Path,
        document_type: DocumentType,
        pipeline: PipelineId,
    ) -> Result<IngestionResult> {
        self.pipeline(pipeline).ingest(path, document_type).await
    }

    /// Query both pipelines and concatenate their results, A first.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] if `k == 0` (checked before any
    /// network call), or the pipeline-A error when both pipelines fail.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be a positive integer".to_string()));
        }

        let (results_a, results_b) =
            tokio::join!(self.pipeline_a.retrieve(query, k), self.pipeline_b.retrieve(query, k));

        match (results_a, results_b) {
            (Ok(mut a), Ok(b)) => {
                a.extend(b);
                info!(result_count = a.len(), "fan-out query completed");
                Ok(a)
            }
            (Ok(a), Err(e)) => {
                warn!(pipeline = "B", error = %e, "pipeline failed during query, degrading");
                Ok(a)
            }
            (Err(e), Ok(b)) => {
                warn!(pipeline = "A", error = %e, "pipeline failed during query, degrading");
                Ok(b)
            }
            (Err(e_a), Err(e_b)) => {
                warn!(pipeline = "B", error = %e_b, "pipeline failed during query");
                Err(e_a)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::chunking::Chunker;
    use crate::embedding::EmbeddingProvider;
    use crate::inmemory::InMemoryVectorStore;

    struct UnitEmbedder;

    #[async_trait]
    impl EmbeddingProvider for UnitEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn pipeline(id: PipelineId) -> Arc<IngestionPipeline> {
        Arc::new(
            IngestionPipeline::builder()
                .id(id)
                .collection("c")
                .loader(Arc::new(FileDocumentLoader::new()))
                .chunker(Arc::new(FixedSizeChunker::default()) as Arc<dyn Chunker>)
                .embedder(Arc::new(UnitEmbedder))
                .store(Arc::new(InMemoryVectorStore::new()))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn pipelines_must_be_tagged_a_and_b() {
        let err = KnowledgeBase::new(pipeline(PipelineId::B), pipeline(PipelineId::B)).unwrap_err();
        assert!(matches!(err, RagError::Config(_)));

        assert!(KnowledgeBase::new(pipeline(PipelineId::A), pipeline(PipelineId::B)).is_ok());
    }

    #[tokio::test]
    async fn search_rejects_zero_k() {
        let kb = KnowledgeBase::new(pipeline(PipelineId::A), pipeline(PipelineId::B)).unwrap();
        let err = kb.search("anything", 0).await.unwrap_err();
        assert!(matches!(err, RagError::InvalidArgument(_)));
    }
}
