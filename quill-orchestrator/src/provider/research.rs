//! LLM-backed research collaborator

use std::sync::Arc;

use async_trait::async_trait;

use super::llm::LlmProvider;
use super::{ProviderError, ResearchProvider, prompts};

pub struct LlmResearchProvider {
    llm: Arc<dyn LlmProvider>,
}

impl LlmResearchProvider {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResearchProvider for LlmResearchProvider {
    async fn fetch_research(&self, keyword: &str) -> Result<String, ProviderError> {
        let text = self.llm.complete(&prompts::research_prompt(keyword)).await?;
        non_empty(text, "research findings")
    }

    async fn synthesize_research(
        &self,
        keyword: &str,
        research_raw: &str,
    ) -> Result<String, ProviderError> {
        let text = self
            .llm
            .complete(&prompts::synthesis_prompt(keyword, research_raw))
            .await?;
        non_empty(text, "research brief")
    }
}

fn non_empty(text: String, what: &str) -> Result<String, ProviderError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::InvalidOutput(format!("empty {}", what)));
    }
    Ok(trimmed.to_string())
}
