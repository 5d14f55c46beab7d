//! Configuration for the pipeline orchestrator.
//!
//! Construction is two-phase: a probe phase discovers the embedding
//! dimension from the live provider, then the configuration is built around
//! that value and never mutated afterward.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use ragline_embeddings::{EmbeddingProvider, probe_dimension};

use crate::error::Result;

/// Default ceiling on input tokens the embedding provider accepts per call.
///
/// Texts exceeding it must be chunked upstream by the retrieval engine, not
/// by the orchestrator.
pub const DEFAULT_MAX_EMBED_TOKENS: usize = 8192;

/// Embedding configuration handed to the retrieval engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Vector width, discovered once at startup and immutable afterward.
    ///
    /// Bound permanently to the storage created from it; reusing storage
    /// across runs with a provider whose dimension changed is undefined.
    pub dimension: usize,

    /// Maximum input tokens per embedding call.
    pub max_token_size: usize,
}

impl EmbeddingSettings {
    /// Create settings for a discovered dimension with the default token
    /// ceiling.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            max_token_size: DEFAULT_MAX_EMBED_TOKENS,
        }
    }
}

/// Configuration for the pipeline orchestrator.
///
/// Created once at startup, owned by the orchestrator for its lifetime, never
/// mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Working directory owned by the retrieval engine's storage.
    pub working_dir: PathBuf,

    /// Embedding configuration carrying the discovered dimension.
    pub embedding: EmbeddingSettings,
}

impl PipelineConfig {
    /// Create a configuration from an already-discovered dimension.
    pub fn new(working_dir: impl Into<PathBuf>, dimension: usize) -> Self {
        Self {
            working_dir: working_dir.into(),
            embedding: EmbeddingSettings::new(dimension),
        }
    }

    /// Set the maximum embedding input token ceiling.
    pub fn with_max_token_size(mut self, max_token_size: usize) -> Self {
        self.embedding.max_token_size = max_token_size;
        self
    }

    /// Run the probe phase against a live provider, then build the
    /// configuration around the discovered dimension.
    pub async fn discover(
        working_dir: impl Into<PathBuf>,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        let dimension = probe_dimension(provider).await?;
        Ok(Self::new(working_dir, dimension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use ragline_embeddings::Embedding;

    struct FixedWidth(usize);

    #[async_trait]
    impl EmbeddingProvider for FixedWidth {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn embed(
            &self,
            texts: &[String],
        ) -> ragline_embeddings::Result<Vec<Embedding>> {
            Ok(texts.iter().map(|_| vec![0.0f32; self.0]).collect())
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::new("/tmp/ragline", 1536);
        assert_eq!(config.embedding.dimension, 1536);
        assert_eq!(config.embedding.max_token_size, DEFAULT_MAX_EMBED_TOKENS);
    }

    #[test]
    fn test_config_token_ceiling_override() {
        let config = PipelineConfig::new("/tmp/ragline", 768).with_max_token_size(2048);
        assert_eq!(config.embedding.max_token_size, 2048);
    }

    #[tokio::test]
    async fn test_discover_runs_the_probe_phase() {
        let provider = FixedWidth(1536);
        let config = PipelineConfig::discover("/tmp/ragline", &provider)
            .await
            .unwrap();
        assert_eq!(config.embedding.dimension, 1536);
    }
}
