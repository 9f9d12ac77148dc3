//! LLM-backed article writer
//!
//! The model must answer with a JSON object `{title, meta_description,
//! content}`. Anything else is `InvalidOutput`; no partial recovery is
//! attempted.

use std::sync::Arc;

use async_trait::async_trait;

use super::llm::LlmProvider;
use super::{Article, ArticleRequest, ArticleWriter, ProviderError, prompts};

pub struct LlmArticleWriter {
    llm: Arc<dyn LlmProvider>,
}

impl LlmArticleWriter {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ArticleWriter for LlmArticleWriter {
    async fn generate_article(&self, request: ArticleRequest<'_>) -> Result<Article, ProviderError> {
        let prompt =
            prompts::article_prompt(request.keyword, request.brief, request.seo, request.retry);
        let raw = self.llm.complete(&prompt).await?;
        parse_article(&raw)
    }
}

/// Parse and validate the writer's JSON answer
pub fn parse_article(raw: &str) -> Result<Article, ProviderError> {
    let json = strip_code_fence(raw);

    let article: Article = serde_json::from_str(json)
        .map_err(|e| ProviderError::InvalidOutput(format!("article is not valid JSON: {}", e)))?;

    if article.title.trim().is_empty() {
        return Err(ProviderError::InvalidOutput("article title is empty".to_string()));
    }
    if article.content.trim().is_empty() {
        return Err(ProviderError::InvalidOutput("article content is empty".to_string()));
    }

    Ok(Article {
        title: article.title.trim().to_string(),
        content: article.content.trim().to_string(),
        meta_description: article.meta_description.trim().to_string(),
    })
}

/// Remove a surrounding ```json fence if the model added one
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
