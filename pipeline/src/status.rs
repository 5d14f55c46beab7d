//! Shared pipeline status.
//!
//! Coordinates ingestion progress between the orchestrator and the engine.
//! This replaces ambient process-wide state with an explicit handle: the
//! orchestrator constructs it exactly once, then passes it by reference into
//! engine ingest and query calls.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

/// Maximum progress messages retained in the history.
const HISTORY_LIMIT: usize = 100;

/// Cloneable handle to the shared pipeline status.
#[derive(Debug, Clone, Default)]
pub struct PipelineStatus {
    inner: Arc<RwLock<StatusInner>>,
}

#[derive(Debug, Default)]
struct StatusInner {
    busy: bool,
    job_name: Option<String>,
    docs_processed: usize,
    latest_message: Option<String>,
    history: Vec<String>,
}

/// Point-in-time view of the pipeline status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    /// Whether a job is currently running.
    pub busy: bool,

    /// Name of the current or most recent job.
    pub job_name: Option<String>,

    /// Number of documents processed so far.
    pub docs_processed: usize,

    /// Most recent progress message.
    pub latest_message: Option<String>,

    /// Retained progress messages, oldest first.
    pub history: Vec<String>,
}

impl PipelineStatus {
    /// Create a fresh, idle status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a job.
    pub async fn begin_job(&self, name: impl Into<String>) {
        let name = name.into();
        debug!("Pipeline job started: {name}");

        let mut inner = self.inner.write().await;
        inner.busy = true;
        inner.job_name = Some(name);
    }

    /// Record a progress message.
    pub async fn update(&self, message: impl Into<String>) {
        let message = message.into();
        debug!("Pipeline status: {message}");

        let mut inner = self.inner.write().await;
        inner.latest_message = Some(message.clone());
        inner.history.push(message);
        if inner.history.len() > HISTORY_LIMIT {
            inner.history.remove(0);
        }
    }

    /// Record one fully processed document.
    pub async fn document_processed(&self) {
        let mut inner = self.inner.write().await;
        inner.docs_processed += 1;
    }

    /// Mark the end of the current job.
    pub async fn finish_job(&self) {
        let mut inner = self.inner.write().await;
        inner.busy = false;
    }

    /// Whether a job is currently running.
    pub async fn is_busy(&self) -> bool {
        self.inner.read().await.busy
    }

    /// Take a point-in-time snapshot.
    pub async fn snapshot(&self) -> StatusSnapshot {
        let inner = self.inner.read().await;
        StatusSnapshot {
            busy: inner.busy,
            job_name: inner.job_name.clone(),
            docs_processed: inner.docs_processed,
            latest_message: inner.latest_message.clone(),
            history: inner.history.clone(),
        }
    }
}
