//! Completion providers.
//!
//! Implements the chat-completion boundary against OpenAI-compatible APIs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LlmError, Result};

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user input.
    User,
    /// Prior model output.
    Assistant,
}

/// One prior turn in a conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who produced this turn.
    pub role: Role,

    /// Text content of the turn.
    pub content: String,
}

impl ChatTurn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request for a text completion.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// The prompt to complete.
    pub prompt: String,

    /// Optional system prompt. When absent, nothing is sent in its place and
    /// the provider's default behavior applies.
    pub system_prompt: Option<String>,

    /// Prior conversation turns, in conversation order.
    pub history: Vec<ChatTurn>,

    /// Provider-specific options merged verbatim into the request body
    /// (e.g. `temperature`, `max_tokens`).
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl CompletionRequest {
    /// Create a new completion request for a prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Set the conversation history.
    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }

    /// Add a provider-specific option.
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// Trait for completion providers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Produce a text completion for the given request.
    ///
    /// Issues exactly one request to the remote provider. Failures propagate
    /// unchanged; there is no local retry or recovery.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// Chat-completion provider for OpenAI-compatible APIs.
pub struct OpenAiCompletions {
    /// Model identifier.
    model: String,

    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,
}

impl OpenAiCompletions {
    /// Create a new provider for the given model, reading credentials from
    /// `OPENAI_API_KEY` and the base URL from `OPENAI_BASE_URL`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            client: reqwest::Client::new(),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Assemble the message list in conversation order: optional system
    /// message, then history, then the user prompt. When `system_prompt` is
    /// `None`, no system message is synthesized.
    fn build_messages(request: &CompletionRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);

        if let Some(system_prompt) = &request.system_prompt {
            messages.push(ChatMessage {
                role: Role::System,
                content: system_prompt.clone(),
            });
        }

        for turn in &request.history {
            messages.push(ChatMessage {
                role: turn.role,
                content: turn.content.clone(),
            });
        }

        messages.push(ChatMessage {
            role: Role::User,
            content: request.prompt.clone(),
        });

        messages
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletions {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(LlmError::ProviderNotConfigured)?;

        debug!("Requesting completion with model: {}", self.model);

        let messages = Self::build_messages(&request);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(map) = body.as_object_mut() {
            for (key, value) in request.options {
                map.insert(key, value);
            }
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(LlmError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiRequest(format!("API error: {error_text}")));
        }

        let result: ChatCompletionResponse = response.json().await?;

        let completion = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("no choices in response".to_string()))?
            .message
            .content;

        info!("Received completion ({} chars)", completion.len());

        Ok(completion)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// A single message on the chat-completions wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: Role,
    content: String,
}

/// Chat-completions API response format.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
