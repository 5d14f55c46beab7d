//! Pipeline orchestration.
//!
//! Composes a configured retrieval engine with the shared pipeline status
//! and drives the startup protocol in strict order: storage initialization,
//! status initialization, one-time ingestion, then query dispatch. Every
//! step awaits the prior one; nothing here runs in parallel.

use std::fmt;

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::engine::{QueryRequest, RetrievalEngine};
use crate::error::{PipelineError, Result};
use crate::status::PipelineStatus;

/// Where the pipeline is in its startup protocol.
///
/// Transitions only move forward within one process lifetime: there is no
/// re-ingestion and no re-probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Engine constructed; storage not yet initialized.
    Constructed,
    /// Storage initialized; status not yet created.
    StorageReady,
    /// Status created; corpus not yet ingested.
    StatusReady,
    /// Corpus ingested; queries are well-defined.
    Ingested,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Constructed => "constructed",
            PipelineState::StorageReady => "storage-ready",
            PipelineState::StatusReady => "status-ready",
            PipelineState::Ingested => "ingested",
        };
        f.write_str(name)
    }
}

/// The pipeline orchestrator.
///
/// Owns its configuration and engine for the process lifetime; neither is
/// recreated between queries.
pub struct Pipeline<E: RetrievalEngine> {
    config: PipelineConfig,
    engine: E,
    status: Option<PipelineStatus>,
    state: PipelineState,
}

impl<E: RetrievalEngine> Pipeline<E> {
    /// Construct the pipeline around a configured engine, creating the
    /// working directory if absent.
    pub fn new(config: PipelineConfig, engine: E) -> Result<Self> {
        std::fs::create_dir_all(&config.working_dir)?;

        info!(
            "Pipeline constructed (working dir: {}, embedding dimension: {})",
            config.working_dir.display(),
            config.embedding.dimension
        );

        Ok(Self {
            config,
            engine,
            status: None,
            state: PipelineState::Constructed,
        })
    }

    /// One-time storage setup on the engine. Must precede everything else.
    pub async fn initialize_storage(&mut self) -> Result<()> {
        self.require(PipelineState::Constructed, "initialize storage")?;

        self.engine.initialize_storage().await?;
        self.state = PipelineState::StorageReady;

        debug!("Storage initialized");
        Ok(())
    }

    /// Create the shared pipeline status. Must follow storage initialization
    /// and precede ingestion.
    pub fn initialize_status(&mut self) -> Result<()> {
        self.require(PipelineState::StorageReady, "initialize status")?;

        self.status = Some(PipelineStatus::new());
        self.state = PipelineState::StatusReady;

        debug!("Pipeline status initialized");
        Ok(())
    }

    /// Run both initialization steps in order.
    pub async fn initialize(&mut self) -> Result<()> {
        self.initialize_storage().await?;
        self.initialize_status()
    }

    /// Submit one document's full text for indexing.
    ///
    /// All-or-nothing: the call awaits engine completion, and a failure
    /// leaves the pipeline short of the `Ingested` state. A second call is
    /// an `InvalidState` error; there is no re-ingestion.
    pub async fn ingest(&mut self, document: &str) -> Result<()> {
        self.require(PipelineState::StatusReady, "ingest")?;
        let status = self.status_handle("ingest")?.clone();

        info!("Ingesting document ({} chars)", document.len());
        self.engine.ingest(document, &status).await?;
        self.state = PipelineState::Ingested;

        Ok(())
    }

    /// Read a document from disk and ingest it.
    pub async fn ingest_file(&mut self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let document = tokio::fs::read_to_string(path.as_ref()).await?;
        self.ingest(&document).await
    }

    /// Dispatch a query to the engine and return its answer verbatim.
    ///
    /// The mode selector and system-prompt template are forwarded untouched;
    /// mode interpretation belongs entirely to the engine.
    pub async fn query(&self, request: &QueryRequest) -> Result<String> {
        self.require(PipelineState::Ingested, "query")?;
        let status = self.status_handle("query")?;

        debug!("Dispatching {} query: {}", request.mode, request.question);
        self.engine.query(request, status).await
    }

    /// Current position in the startup protocol.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The immutable pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The shared status handle, once initialized.
    pub fn status(&self) -> Option<&PipelineStatus> {
        self.status.as_ref()
    }

    fn require(&self, expected: PipelineState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(PipelineError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn status_handle(&self, operation: &'static str) -> Result<&PipelineStatus> {
        self.status.as_ref().ok_or(PipelineError::InvalidState {
            operation,
            state: self.state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::mode::QueryMode;

    /// Engine that accepts everything and answers with the mode name.
    struct NoopEngine;

    #[async_trait]
    impl RetrievalEngine for NoopEngine {
        async fn initialize_storage(&mut self) -> Result<()> {
            Ok(())
        }

        async fn ingest(&mut self, _document: &str, _status: &PipelineStatus) -> Result<()> {
            Ok(())
        }

        async fn query(&self, request: &QueryRequest, _status: &PipelineStatus) -> Result<String> {
            Ok(request.mode.as_str().to_string())
        }
    }

    fn pipeline(dir: &TempDir) -> Pipeline<NoopEngine> {
        Pipeline::new(PipelineConfig::new(dir.path(), 4), NoopEngine).unwrap()
    }

    #[tokio::test]
    async fn test_startup_protocol_in_order() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline(&dir);
        assert_eq!(pipeline.state(), PipelineState::Constructed);

        pipeline.initialize_storage().await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::StorageReady);

        pipeline.initialize_status().unwrap();
        assert_eq!(pipeline.state(), PipelineState::StatusReady);

        pipeline.ingest("hello world").await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Ingested);

        let answer = pipeline
            .query(&QueryRequest::new("anything", QueryMode::Naive))
            .await
            .unwrap();
        assert_eq!(answer, "naive");
    }

    #[tokio::test]
    async fn test_query_before_ingest_is_a_defined_failure() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline(&dir);
        pipeline.initialize().await.unwrap();

        let err = pipeline
            .query(&QueryRequest::new("too early", QueryMode::Local))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::InvalidState {
                operation: "query",
                state: PipelineState::StatusReady,
            }
        ));
    }

    #[tokio::test]
    async fn test_ingest_before_initialization_fails() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline(&dir);

        let err = pipeline.ingest("too early").await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_status_before_storage_fails() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline(&dir);

        let err = pipeline.initialize_status().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidState {
                operation: "initialize status",
                state: PipelineState::Constructed,
            }
        ));
    }

    #[tokio::test]
    async fn test_no_reingestion() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline(&dir);
        pipeline.initialize().await.unwrap();
        pipeline.ingest("first").await.unwrap();

        let err = pipeline.ingest("second").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidState {
                operation: "ingest",
                state: PipelineState::Ingested,
            }
        ));
    }

    #[tokio::test]
    async fn test_double_storage_initialization_fails() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline(&dir);
        pipeline.initialize_storage().await.unwrap();

        let err = pipeline.initialize_storage().await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_new_creates_working_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("corpus/store");

        let _pipeline = Pipeline::new(PipelineConfig::new(&nested, 4), NoopEngine).unwrap();
        assert!(nested.is_dir());
    }
}
