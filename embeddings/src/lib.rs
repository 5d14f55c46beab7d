//! # Embeddings
//!
//! This crate provides the embedding boundary for the ragline pipeline:
//!
//! - **Embedding Generation**: one batched, order-preserving call per request
//! - **Dimension Probing**: discover the model's vector width at startup
//! - **Similarity Math**: cosine ranking used by the reference engine
//!
//! The embedding dimension is a property of the remote model configuration
//! and cannot be assumed statically; [`probe_dimension`] discovers it once,
//! before any index storage is created.

pub mod error;
pub mod probe;
pub mod provider;
pub mod similarity;

pub use error::{EmbeddingError, Result};
pub use probe::{PROBE_SENTENCE, probe_dimension};
pub use provider::{EmbeddingProvider, OpenAiEmbeddings};
pub use similarity::{SimilarityResult, cosine_similarity, find_top_k, normalize};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
