//! In-process reference engine.
//!
//! `MemoryEngine` is a small retrieval engine over a flat passage index,
//! giving the demo binary and the integration tests a concrete collaborator.
//! It is not a knowledge graph: `naive` and `local` retrieve the top-k
//! passages by cosine similarity, and the graph-flavored `global` and
//! `hybrid` modes fall back to a wider passage budget.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ragline_embeddings::{Embedding, EmbeddingError, EmbeddingProvider, find_top_k, normalize};
use ragline_llm::{CompletionProvider, CompletionRequest};

use crate::config::EmbeddingSettings;
use crate::engine::{QueryRequest, RetrievalEngine};
use crate::error::Result;
use crate::mode::QueryMode;
use crate::status::PipelineStatus;

/// File the passage index is persisted to inside the working directory.
const INDEX_FILE: &str = "passages.json";

/// Filled into `{response_type}` when the template carries the placeholder.
const DEFAULT_RESPONSE_TYPE: &str = "Multiple Paragraphs";

/// Template used when a query carries no system prompt of its own.
const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful assistant answering questions about the provided knowledge base.

---Conversation History---
{history}

---Knowledge Base---
{context_data}

Target format and length: {response_type}";

/// Approximate characters per input token, used to bound passage size.
const CHARS_PER_TOKEN: usize = 4;

/// One indexed passage.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Passage {
    id: String,
    text: String,
    embedding: Embedding,
}

/// Flat-index retrieval engine backed by the completion and embedding
/// providers it was constructed with.
pub struct MemoryEngine {
    completions: Arc<dyn CompletionProvider>,
    embeddings: Arc<dyn EmbeddingProvider>,
    settings: EmbeddingSettings,
    working_dir: PathBuf,
    top_k: usize,
    min_score: f32,
    passages: Vec<Passage>,
}

impl MemoryEngine {
    /// Create an engine rooted at the given working directory.
    pub fn new(
        completions: Arc<dyn CompletionProvider>,
        embeddings: Arc<dyn EmbeddingProvider>,
        settings: EmbeddingSettings,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            completions,
            embeddings,
            settings,
            working_dir: working_dir.into(),
            top_k: 5,
            min_score: 0.1,
            passages: Vec::new(),
        }
    }

    /// Set how many passages a naive query retrieves.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the minimum similarity score for retrieved passages.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Number of indexed passages.
    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    fn index_path(&self) -> PathBuf {
        self.working_dir.join(INDEX_FILE)
    }

    async fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.passages)?;
        tokio::fs::write(self.index_path(), json).await?;
        Ok(())
    }

    /// Candidate budget per mode. A flat index has no graph to walk, so the
    /// graph-flavored modes widen the passage budget instead.
    fn candidate_budget(&self, mode: QueryMode) -> usize {
        match mode {
            QueryMode::Naive | QueryMode::Local => self.top_k,
            QueryMode::Global | QueryMode::Hybrid => self.top_k * 2,
        }
    }
}

/// Split a document into passages on blank lines, packing over-long blocks
/// into word-aligned pieces no larger than `max_chars`.
fn split_passages(document: &str, max_chars: usize) -> Vec<String> {
    let mut passages = Vec::new();

    for block in document.split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        if block.len() <= max_chars {
            passages.push(block.to_string());
            continue;
        }

        let mut current = String::new();
        for word in block.split_whitespace() {
            if !current.is_empty() && current.len() + word.len() + 1 > max_chars {
                passages.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            passages.push(current);
        }
    }

    passages
}

/// Fill the response-shaping template's placeholders.
fn render_prompt(template: &str, history: &str, context_data: &str) -> String {
    template
        .replace("{history}", history)
        .replace("{context_data}", context_data)
        .replace("{response_type}", DEFAULT_RESPONSE_TYPE)
}

#[async_trait]
impl RetrievalEngine for MemoryEngine {
    async fn initialize_storage(&mut self) -> Result<()> {
        tokio::fs::create_dir_all(&self.working_dir).await?;

        let index_path = self.index_path();
        if index_path.is_file() {
            let json = tokio::fs::read_to_string(&index_path).await?;
            self.passages = serde_json::from_str(&json)?;
            info!("Loaded {} passages from {INDEX_FILE}", self.passages.len());
        }

        Ok(())
    }

    async fn ingest(&mut self, document: &str, status: &PipelineStatus) -> Result<()> {
        status.begin_job("ingest").await;

        let max_chars = self.settings.max_token_size * CHARS_PER_TOKEN;
        let texts = split_passages(document, max_chars);
        status
            .update(format!("embedding {} passages", texts.len()))
            .await;

        let mut embeddings = self.embeddings.embed(&texts).await?;

        for embedding in &mut embeddings {
            if embedding.len() != self.settings.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.settings.dimension,
                    actual: embedding.len(),
                }
                .into());
            }
            normalize(embedding);
        }

        let offset = self.passages.len();
        for (i, (text, embedding)) in texts.into_iter().zip(embeddings).enumerate() {
            self.passages.push(Passage {
                id: format!("p{}", offset + i),
                text,
                embedding,
            });
        }

        self.persist().await?;

        status.document_processed().await;
        status
            .update(format!("indexed {} passages", self.passages.len()))
            .await;
        status.finish_job().await;

        info!("Ingested document into {} passages", self.passages.len());
        Ok(())
    }

    async fn query(&self, request: &QueryRequest, _status: &PipelineStatus) -> Result<String> {
        let mut query_embedding = self
            .embeddings
            .embed(&[request.question.clone()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                EmbeddingError::InvalidResponse("no embedding for query".to_string())
            })?;
        normalize(&mut query_embedding);

        let candidates: Vec<(String, Embedding)> = self
            .passages
            .iter()
            .map(|p| (p.id.clone(), p.embedding.clone()))
            .collect();

        let budget = self.candidate_budget(request.mode);
        let ranked = find_top_k(&query_embedding, &candidates, budget, self.min_score)?;

        debug!(
            "{} query retrieved {} of {} passages",
            request.mode,
            ranked.len(),
            self.passages.len()
        );

        let context_data = ranked
            .iter()
            .filter_map(|r| self.passages.iter().find(|p| p.id == r.id))
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let template = request
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let system_prompt = render_prompt(template, "None", &context_data);

        let completion = CompletionRequest::new(request.question.clone())
            .with_system_prompt(system_prompt);

        Ok(self.completions.complete(completion).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_passages_on_blank_lines() {
        let document = "First paragraph.\n\nSecond paragraph.\n\n\n\nThird.";
        let passages = split_passages(document, 1000);
        assert_eq!(
            passages,
            vec!["First paragraph.", "Second paragraph.", "Third."]
        );
    }

    #[test]
    fn test_split_passages_packs_long_blocks() {
        let block = "word ".repeat(100);
        let passages = split_passages(block.trim(), 40);

        assert!(passages.len() > 1);
        assert!(passages.iter().all(|p| p.len() <= 40));
        let words: usize = passages.iter().map(|p| p.split_whitespace().count()).sum();
        assert_eq!(words, 100);
    }

    #[test]
    fn test_split_passages_skips_empty_blocks() {
        assert!(split_passages("\n\n  \n\n", 100).is_empty());
    }

    #[test]
    fn test_render_prompt_fills_placeholders() {
        let rendered = render_prompt(
            "H: {history} | KB: {context_data} | {response_type}",
            "None",
            "facts",
        );
        assert_eq!(rendered, "H: None | KB: facts | Multiple Paragraphs");
    }

    #[test]
    fn test_render_prompt_leaves_plain_templates_alone() {
        assert_eq!(render_prompt("no placeholders", "x", "y"), "no placeholders");
    }
}
