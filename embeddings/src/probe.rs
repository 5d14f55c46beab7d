//! Dimension probing.
//!
//! The retrieval engine must be told the embedding vector width before it
//! allocates index storage, but the width is a property of the remote model
//! configuration. [`probe_dimension`] discovers it at startup by embedding a
//! fixed sentinel sentence once and reading the width of the result.

use tracing::info;

use crate::error::{EmbeddingError, Result};
use crate::provider::EmbeddingProvider;

/// Sentinel sentence embedded once at startup to discover the vector width.
pub const PROBE_SENTENCE: &str = "This is a test sentence.";

/// Discover the embedding dimension of a provider.
///
/// Deterministic for a fixed provider configuration: probing twice yields the
/// same width. Callers run this exactly once per process, before constructing
/// the pipeline; the result is treated as ground truth afterward and never
/// re-probed.
pub async fn probe_dimension(provider: &dyn EmbeddingProvider) -> Result<usize> {
    let embeddings = provider.embed(&[PROBE_SENTENCE.to_string()]).await?;

    let dimension = embeddings
        .first()
        .map(Vec::len)
        .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding for probe".to_string()))?;

    if dimension == 0 {
        return Err(EmbeddingError::InvalidResponse(
            "probe returned an empty vector".to_string(),
        ));
    }

    info!("Detected embedding dimension: {dimension}");

    Ok(dimension)
}
