//! # Ingest and Query
//!
//! Ingests a document through both pipelines and runs a fan-out query.
//!
//! Requires the production environment variables: `EMBEDDING_A_*`,
//! `QDRANT_URL` (pipeline A), `EMBEDDING_B_*`, `PG_VECTOR_CONNECTION`
//! (pipeline B), and optionally `OPENAI_API_KEY` + `LLM_MODEL` for
//! description generation.
//!
//! Run: `cargo run --example ingest_and_query -- <file.pdf|file.docx>`

use std::path::Path;

use docket_rag::{DocumentType, KnowledgeBase, PipelineId};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("docket_rag=debug,info").init();

    let path_arg = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: ingest_and_query <file.pdf|file.docx>"))?;
    let path = Path::new(&path_arg);

    let document_type: DocumentType = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let kb = KnowledgeBase::from_env().await?;

    println!("Ingesting {} through pipeline A...", path.display());
    let result_a = kb.ingest_file(path, document_type, PipelineId::A).await?;
    if let Some(description) = &result_a.description {
        println!("  description: {description}");
    }

    println!("Ingesting {} through pipeline B...", path.display());
    kb.ingest_file(path, document_type, PipelineId::B).await?;

    println!("\nQuery: \"what is this document about\"");
    let results = kb.search("what is this document about", 5).await?;
    for (i, result) in results.iter().enumerate() {
        let pipeline = result.chunk.metadata.get("pipeline").map(String::as_str).unwrap_or("?");
        let preview: String = result.chunk.text.chars().take(80).collect();
        println!("{:2}. [{}] ({:.3}) {}", i + 1, pipeline, result.score, preview);
    }

    Ok(())
}
