//! Demo driver for the ragline pipeline.
//!
//! Configured entirely through the environment (a `.env` file is honored):
//!
//! - `LLM_MODEL` — completion model identifier (required)
//! - `EMBEDDING_MODEL` — embedding model identifier (required)
//! - `OPENAI_API_KEY` — credentials for both providers (required)
//! - `OPENAI_BASE_URL` — provider base URL (default: api.openai.com)
//! - `RAGLINE_DOCUMENT` — path of the document to ingest (required)
//! - `RAGLINE_WORKING_DIR` — storage directory (default: ./ragline-data)
//! - `RAGLINE_QUESTION` — question to run across all modes (optional)
//!
//! The driver probes the embedding dimension, initializes storage and
//! status, ingests the document once, then runs the same question through
//! the naive, local, global, and hybrid retrieval modes.

use std::env;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ragline_embeddings::OpenAiEmbeddings;
use ragline_llm::OpenAiCompletions;
use ragline_pipeline::{MemoryEngine, Pipeline, PipelineConfig, QueryMode, QueryRequest};

/// Response-shaping prompt applied uniformly across modes.
const CUSTOM_PROMPT: &str = "\
You are an expert assistant answering questions about the ingested document.
Provide detailed and structured answers grounded strictly in the knowledge
base below; say so when the knowledge base does not cover the question.

---Conversation History---
{history}

---Knowledge Base---
{context_data}

---Response Rules---

Target format and length: {response_type}";

const DEFAULT_QUESTION: &str = "What are the main topics of this document?";

async fn run() -> anyhow::Result<()> {
    let llm_model = env::var("LLM_MODEL").context("LLM_MODEL is not set")?;
    let embedding_model = env::var("EMBEDDING_MODEL").context("EMBEDDING_MODEL is not set")?;
    let document_path = env::var("RAGLINE_DOCUMENT").context("RAGLINE_DOCUMENT is not set")?;
    let working_dir =
        env::var("RAGLINE_WORKING_DIR").unwrap_or_else(|_| "./ragline-data".to_string());
    let question = env::var("RAGLINE_QUESTION").unwrap_or_else(|_| DEFAULT_QUESTION.to_string());

    let completions = Arc::new(OpenAiCompletions::new(llm_model));
    let embeddings = Arc::new(OpenAiEmbeddings::new(embedding_model));

    // Probe phase: the vector width is a property of the remote model and
    // must be known before the engine allocates index storage.
    let config = PipelineConfig::discover(&working_dir, embeddings.as_ref())
        .await
        .context("failed to probe embedding dimension")?;
    info!(
        "Detected embedding dimension: {}",
        config.embedding.dimension
    );

    let engine = MemoryEngine::new(completions, embeddings, config.embedding, &working_dir);

    let mut pipeline = Pipeline::new(config, engine)?;
    pipeline.initialize_storage().await?;
    pipeline.initialize_status()?;

    pipeline
        .ingest_file(&document_path)
        .await
        .with_context(|| format!("failed to ingest {document_path}"))?;

    for mode in QueryMode::ALL {
        let request = QueryRequest::new(question.as_str(), mode).with_system_prompt(CUSTOM_PROMPT);
        let answer = pipeline.query(&request).await?;

        println!("[{mode}]");
        println!("{answer}");
        println!("\n -------- \n");
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("An error occurred: {err:#}");
        std::process::exit(1);
    }
}
