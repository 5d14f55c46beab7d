//! Retrieval engine boundary.
//!
//! The engine is a black-box collaborator: how it indexes, which algorithm
//! backs each query mode, and how it lays out the working directory are its
//! own concerns. The orchestrator only calls these operations, in a fixed
//! order.

use async_trait::async_trait;

use crate::error::Result;
use crate::mode::QueryMode;
use crate::status::PipelineStatus;

/// A natural-language query against the ingested corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// The question to answer.
    pub question: String,

    /// Retrieval strategy to use. No default is inferred.
    pub mode: QueryMode,

    /// Optional response-shaping prompt template with `{history}`,
    /// `{context_data}`, and `{response_type}` placeholders. Applied
    /// uniformly across modes.
    pub system_prompt: Option<String>,
}

impl QueryRequest {
    /// Create a query for the given question and mode.
    pub fn new(question: impl Into<String>, mode: QueryMode) -> Self {
        Self {
            question: question.into(),
            mode,
            system_prompt: None,
        }
    }

    /// Set the response-shaping prompt template.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// Trait for retrieval engines.
///
/// The orchestrator guarantees call order: `initialize_storage` first, then
/// `ingest` exactly once, then any number of `query` calls. Implementations
/// may rely on that order.
#[async_trait]
pub trait RetrievalEngine: Send + Sync {
    /// One-time storage setup. Must complete before ingestion or queries.
    async fn initialize_storage(&mut self) -> Result<()>;

    /// Index one document's full text. All-or-nothing from the caller's
    /// perspective.
    async fn ingest(&mut self, document: &str, status: &PipelineStatus) -> Result<()>;

    /// Answer a question using the requested retrieval mode.
    async fn query(&self, request: &QueryRequest, status: &PipelineStatus) -> Result<String>;
}
