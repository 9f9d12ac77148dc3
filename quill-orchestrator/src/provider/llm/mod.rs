//! LLM provider abstraction
//!
//! The research and writing collaborators are prompt builders over a plain
//! text-completion provider, so the backend can be swapped for a fake in
//! tests and local runs.

mod claude;
mod fake;

pub use claude::ClaudeProvider;
pub use fake::FakeProvider;

use async_trait::async_trait;
use std::fmt;

use super::ProviderError;

/// Text-completion backend
///
/// Implementations must be thread-safe; one instance serves every stage.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a prompt and return the model's text response
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Provider name (e.g. "claude", "fake")
    fn provider_name(&self) -> &'static str;

    fn model_name(&self) -> &str;
}
