//! Agent-facing tools over the knowledge base.
//!
//! [`SearchTool`] and [`IngestTool`] wrap the [`KnowledgeBase`] as
//! [`docket_core::Tool`]s so the conversational agent can retrieve and
//! ingest autonomously. Every internal failure is translated at this
//! boundary; nothing crosses into the agent as a panic.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use docket_core::{CoreError, DocumentType, Tool, ToolContext};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::document::{PipelineId, SearchResult};
use crate::error::RagError;
use crate::knowledge::KnowledgeBase;

/// Translate a [`RagError`] for the agent boundary. Bad arguments stay
/// caller-visible; everything else is flattened into a generic tool error.
fn to_core_error(e: RagError) -> CoreError {
    match e {
        RagError::InvalidArgument(message) => CoreError::InvalidArgument(message),
        other => CoreError::Tool(other.to_string()),
    }
}

/// Render search results as `{content, metadata}` records.
fn results_to_json(results: &[SearchResult]) -> Value {
    Value::Array(
        results
            .iter()
            .map(|r| {
                json!({
                    "content": r.chunk.text,
                    "metadata": r.chunk.metadata,
                })
            })
            .collect(),
    )
}

/// Retrieval tool: searches both pipelines and returns merged chunks.
pub struct SearchTool {
    knowledge_base: Arc<KnowledgeBase>,
    default_k: usize,
}

impl SearchTool {
    /// Create a new search tool. The knowledge base's configured `top_k` is
    /// used when the agent omits the `k` argument.
    pub fn new(knowledge_base: Arc<KnowledgeBase>) -> Self {
        let default_k = knowledge_base.config().top_k;
        Self { knowledge_base, default_k }
    }

    /// Override the `k` used when the agent omits the argument.
    pub fn with_default_k(mut self, default_k: usize) -> Self {
        self.default_k = default_k;
        self
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search_knowledge_base"
    }

    fn description(&self) -> &str {
        "Search the internal knowledge base for document chunks relevant to a query"
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "k": {
                    "type": "integer",
                    "description": "Number of chunks to retrieve per pipeline. Uses the default if omitted."
                }
            },
            "required": ["query"]
        }))
    }

    async fn execute(
        &self,
        _ctx: Arc<dyn ToolContext>,
        args: Value,
    ) -> docket_core::Result<Value> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CoreError::InvalidArgument("missing required 'query' parameter".into()))?;

        let k = match args.get("k") {
            None | Some(Value::Null) => self.default_k,
            Some(v) => v.as_u64().filter(|k| *k > 0).ok_or_else(|| {
                CoreError::InvalidArgument("'k' must be a positive integer".into())
            })? as usize,
        };

        info!(query, k, "search_knowledge_base tool called");

        let results = self.knowledge_base.search(query, k).await.map_err(|e| {
            error!(error = %e, "knowledge base search failed");
            to_core_error(e)
        })?;

        Ok(results_to_json(&results))
    }
}

/// Ingestion tool: routes a file into one of the two pipelines.
pub struct IngestTool {
    knowledge_base: Arc<KnowledgeBase>,
}

impl IngestTool {
    /// Create a new ingestion tool.
    pub fn new(knowledge_base: Arc<KnowledgeBase>) -> Self {
        Self { knowledge_base }
    }
}

#[async_trait]
impl Tool for IngestTool {
    fn name(&self) -> &str {
        "ingest_file"
    }

    fn description(&self) -> &str {
        "Ingest a PDF or DOCX file into the knowledge base through pipeline A or B"
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Local path or http(s) URL of the document"
                },
                "document_type": {
                    "type": "string",
                    "enum": ["pdf", "docx"],
                    "description": "The document format"
                },
                "pipeline": {
                    "type": "string",
                    "enum": ["A", "B"],
                    "description": "Which ingestion pipeline to use"
                }
            },
            "required": ["file_path", "document_type", "pipeline"]
        }))
    }

    async fn execute(
        &self,
        _ctx: Arc<dyn ToolContext>,
        args: Value,
    ) -> docket_core::Result<Value> {
        let file_path = args
            .get("file_path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                CoreError::InvalidArgument("missing required 'file_path' parameter".into())
            })?;

        let document_type: DocumentType = args
            .get("document_type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                CoreError::InvalidArgument("missing required 'document_type' parameter".into())
            })?
            .parse()?;

        // Arguments are validated in full before any I/O happens.
        let pipeline: PipelineId = args
            .get("pipeline")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                CoreError::InvalidArgument("missing required 'pipeline' parameter".into())
            })?
            .parse()
            .map_err(to_core_error)?;

        info!(file_path, %document_type, %pipeline, "ingest_file tool called");

        let result = self
            .knowledge_base
            .ingest_file(Path::new(file_path), document_type, pipeline)
            .await
            .map_err(|e| {
                error!(error = %e, "ingestion failed");
                to_core_error(e)
            })?;

        Ok(json!({
            "pipeline": result.pipeline,
            "description": result.description.unwrap_or_default(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use docket_core::DetachedContext;

    use crate::chunking::FixedSizeChunker;
    use crate::embedding::EmbeddingProvider;
    use crate::error::Result;
    use crate::inmemory::InMemoryVectorStore;
    use crate::loader::FileDocumentLoader;
    use crate::pipeline::IngestionPipeline;

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

    fn knowledge_base() -> Arc<KnowledgeBase> {
        let pipeline = |id| {
            Arc::new(
                IngestionPipeline::builder()
                    .id(id)
                    .collection("c")
                    .loader(Arc::new(FileDocumentLoader::new()))
                    .chunker(Arc::new(FixedSizeChunker::default()))
                    .embedder(Arc::new(UnitEmbedder))
                    .store(Arc::new(InMemoryVectorStore::new()))
                    .build()
                    .unwrap(),
            )
        };
        Arc::new(KnowledgeBase::new(pipeline(PipelineId::A), pipeline(PipelineId::B)).unwrap())
    }

    #[tokio::test]
    async fn ingest_tool_rejects_invalid_pipeline() {
        let tool = IngestTool::new(knowledge_base());
        let args = json!({
            "file_path": "/tmp/report.docx",
            "document_type": "docx",
            "pipeline": "C",
        });

        let err = tool.execute(Arc::new(DetachedContext), args).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn ingest_tool_rejects_unknown_document_type() {
        let tool = IngestTool::new(knowledge_base());
        let args = json!({
            "file_path": "/tmp/report.odt",
            "document_type": "odt",
            "pipeline": "A",
        });

        let err = tool.execute(Arc::new(DetachedContext), args).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn search_tool_requires_query() {
        let tool = SearchTool::new(knowledge_base());
        let err = tool.execute(Arc::new(DetachedContext), json!({})).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn search_tool_rejects_zero_k() {
        let tool = SearchTool::new(knowledge_base());
        let args = json!({ "query": "anything", "k": 0 });
        let err = tool.execute(Arc::new(DetachedContext), args).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }
}
