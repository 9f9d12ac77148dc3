//! Collaborator adapters
//!
//! The pipeline consumes three opaque collaborators: research, SEO analysis
//! and article writing. Each sits behind a trait so stages can be tested
//! with scripted fakes.

pub mod llm;
pub mod prompts;
pub mod research;
pub mod seo;
pub mod writer;

use std::sync::Arc;

use async_trait::async_trait;
use quill_core::domain::seo::SeoAnalysis;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{Config, LlmProviderKind, SeoProviderKind};
use llm::{ClaudeProvider, FakeProvider, LlmProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("failed to parse response: {0}")]
    ParseError(String),

    #[error("invalid output: {0}")]
    InvalidOutput(String),

    #[error("rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("timed out: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Errors worth one more attempt within the same stage run
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::InvalidOutput(_) | ProviderError::RateLimited { .. }
        )
    }
}

/// Hints for the single low-score regeneration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryHints {
    pub previous_score: u32,
    pub missing_terms: Vec<String>,
}

/// Everything the writer is told about one article
#[derive(Debug, Clone, Copy)]
pub struct ArticleRequest<'a> {
    pub keyword: &'a str,
    pub brief: &'a str,
    pub seo: Option<&'a SeoAnalysis>,
    pub retry: Option<&'a RetryHints>,
}

/// Validated writer output
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub meta_description: String,
}

#[async_trait]
pub trait ResearchProvider: Send + Sync {
    /// Unstructured findings for a keyword
    async fn fetch_research(&self, keyword: &str) -> Result<String, ProviderError>;

    /// Condense raw findings into a writing brief
    async fn synthesize_research(
        &self,
        keyword: &str,
        research_raw: &str,
    ) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait SeoProvider: Send + Sync {
    async fn fetch_analysis(&self, keyword: &str) -> Result<SeoAnalysis, ProviderError>;

    /// Submit the final article and return the provider's own score, if any
    async fn import_for_official_score(
        &self,
        provider_handle: &str,
        title: &str,
        description: &str,
        html: &str,
    ) -> Result<Option<u32>, ProviderError>;
}

#[async_trait]
pub trait ArticleWriter: Send + Sync {
    async fn generate_article(&self, request: ArticleRequest<'_>) -> Result<Article, ProviderError>;
}

/// The collaborators one orchestrator instance uses
#[derive(Clone)]
pub struct Providers {
    pub research: Arc<dyn ResearchProvider>,
    /// `None` when no SEO backend is configured
    pub seo: Option<Arc<dyn SeoProvider>>,
    pub writer: Arc<dyn ArticleWriter>,
}

/// Build the collaborators selected by the configuration
pub fn build_providers(config: &Config) -> Result<Providers, ProviderError> {
    let llm: Arc<dyn LlmProvider> = match config.llm_provider {
        LlmProviderKind::Claude => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .ok_or_else(|| ProviderError::NotConfigured("ANTHROPIC_API_KEY not set".to_string()))?;
            Arc::new(ClaudeProvider::new(api_key, config.llm_model.clone()))
        }
        LlmProviderKind::Fake => Arc::new(FakeProvider::with_pipeline_responses()),
    };

    tracing::info!(
        "Using LLM provider {} ({})",
        llm.provider_name(),
        llm.model_name()
    );

    let seo: Option<Arc<dyn SeoProvider>> = match config.seo_provider {
        SeoProviderKind::Http => {
            let (Some(url), Some(key)) = (&config.seo_api_url, &config.seo_api_key) else {
                return Err(ProviderError::NotConfigured(
                    "SEO_API_URL and SEO_API_KEY must be set".to_string(),
                ));
            };
            Some(Arc::new(seo::HttpSeoProvider::new(
                url.clone(),
                key.clone(),
                config.pipeline.seo_timeout,
            )))
        }
        SeoProviderKind::None => {
            tracing::warn!("No SEO provider configured, articles will not be scored");
            None
        }
    };

    Ok(Providers {
        research: Arc::new(research::LlmResearchProvider::new(llm.clone())),
        seo,
        writer: Arc::new(writer::LlmArticleWriter::new(llm)),
    })
}
