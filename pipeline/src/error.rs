//! Error types for the pipeline orchestrator.

use thiserror::Error;

use crate::orchestrator::PipelineState;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur in the pipeline orchestrator.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Completion provider error.
    #[error("llm error: {0}")]
    Llm(#[from] ragline_llm::LlmError),

    /// Embedding provider error.
    #[error("embedding error: {0}")]
    Embedding(#[from] ragline_embeddings::EmbeddingError),

    /// Operation issued out of the startup order.
    #[error("cannot {operation} while pipeline is {state}")]
    InvalidState {
        operation: &'static str,
        state: PipelineState,
    },

    /// Unrecognized query mode.
    #[error("unknown query mode: {0}")]
    UnknownMode(String),

    /// Retrieval engine error.
    #[error("engine error: {0}")]
    Engine(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
