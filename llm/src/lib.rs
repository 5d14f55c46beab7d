//! # LLM Completions
//!
//! This crate provides chat-completion adapters for OpenAI-compatible
//! providers. A [`CompletionProvider`] turns a prompt, an optional system
//! prompt, and an ordered conversation history into one text completion per
//! call.
//!
//! Providers issue exactly one network request per completion and surface
//! failures unchanged; no caching or retry layer lives here.

pub mod completion;
pub mod error;

pub use completion::{
    ChatTurn, CompletionProvider, CompletionRequest, OpenAiCompletions, Role,
};
pub use error::{LlmError, Result};
