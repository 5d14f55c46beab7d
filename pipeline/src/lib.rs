//! # Pipeline Orchestrator
//!
//! This crate wires a completion provider, an embedding provider, and a
//! retrieval engine into one query pipeline:
//!
//! - **Two-phase configuration**: probe the embedding dimension, then freeze
//!   it into a [`PipelineConfig`]
//! - **Strict startup protocol**: storage initialization, then status
//!   initialization, then one-time ingestion
//! - **Query dispatch**: four retrieval modes behind a closed selector,
//!   forwarded untouched to the engine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ragline_pipeline::{Pipeline, PipelineConfig, QueryMode, QueryRequest};
//!
//! let config = PipelineConfig::discover("./data", &embedder).await?;
//! let mut pipeline = Pipeline::new(config, engine)?;
//! pipeline.initialize().await?;
//! pipeline.ingest_file("dataset/corpus.html").await?;
//!
//! let answer = pipeline
//!     .query(&QueryRequest::new("What changed?", QueryMode::Hybrid))
//!     .await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod mode;
pub mod orchestrator;
pub mod status;

pub use config::{DEFAULT_MAX_EMBED_TOKENS, EmbeddingSettings, PipelineConfig};
pub use engine::{QueryRequest, RetrievalEngine};
pub use error::{PipelineError, Result};
pub use memory::MemoryEngine;
pub use mode::QueryMode;
pub use orchestrator::{Pipeline, PipelineState};
pub use status::{PipelineStatus, StatusSnapshot};
