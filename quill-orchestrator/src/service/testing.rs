//! Scripted collaborators for stage and dispatcher tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quill_content::LinkCatalog;
use quill_core::domain::seo::SeoAnalysis;

use super::StageContext;
use crate::config::PipelineConfig;
use crate::provider::{
    Article, ArticleRequest, ArticleWriter, ProviderError, Providers, ResearchProvider,
    RetryHints, SeoProvider,
};
use crate::repository::PipelineStore;
use crate::repository::memory::MemoryStore;

pub struct ScriptedResearch {
    pub fail_fetch: bool,
    pub synthesis_delay: Duration,
    pub fetches: Mutex<Vec<String>>,
}

impl ScriptedResearch {
    pub fn new() -> Self {
        Self {
            fail_fetch: false,
            synthesis_delay: Duration::ZERO,
            fetches: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ResearchProvider for ScriptedResearch {
    async fn fetch_research(&self, keyword: &str) -> Result<String, ProviderError> {
        self.fetches.lock().unwrap().push(keyword.to_string());
        if self.fail_fetch {
            return Err(ProviderError::ApiError {
                status: 503,
                message: "research backend down".to_string(),
            });
        }
        Ok(format!("findings about {}", keyword))
    }

    async fn synthesize_research(
        &self,
        keyword: &str,
        _research_raw: &str,
    ) -> Result<String, ProviderError> {
        tokio::time::sleep(self.synthesis_delay).await;
        Ok(format!("brief for {}", keyword))
    }
}

pub struct ScriptedSeo {
    pub analysis: SeoAnalysis,
    pub delay: Duration,
    pub official_score: Option<u32>,
    pub fetches: Mutex<u32>,
}

impl ScriptedSeo {
    pub fn new(analysis: SeoAnalysis) -> Self {
        Self {
            analysis,
            delay: Duration::ZERO,
            official_score: None,
            fetches: Mutex::new(0),
        }
    }
}

#[async_trait]
impl SeoProvider for ScriptedSeo {
    async fn fetch_analysis(&self, _keyword: &str) -> Result<SeoAnalysis, ProviderError> {
        *self.fetches.lock().unwrap() += 1;
        tokio::time::sleep(self.delay).await;
        Ok(self.analysis.clone())
    }

    async fn import_for_official_score(
        &self,
        _provider_handle: &str,
        _title: &str,
        _description: &str,
        _html: &str,
    ) -> Result<Option<u32>, ProviderError> {
        Ok(self.official_score)
    }
}

/// Returns queued drafts in order and records the retry hints of each call
pub struct ScriptedWriter {
    drafts: Mutex<VecDeque<Result<Article, ProviderError>>>,
    delays: Mutex<VecDeque<Duration>>,
    pub calls: Mutex<Vec<Option<RetryHints>>>,
}

impl ScriptedWriter {
    pub fn new(drafts: Vec<Result<Article, ProviderError>>) -> Self {
        Self {
            drafts: Mutex::new(drafts.into()),
            delays: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Hold the nth call for the nth delay before returning its draft
    pub fn delayed(self, delays: Vec<Duration>) -> Self {
        *self.delays.lock().unwrap() = delays.into();
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ArticleWriter for ScriptedWriter {
    async fn generate_article(&self, request: ArticleRequest<'_>) -> Result<Article, ProviderError> {
        self.calls.lock().unwrap().push(request.retry.cloned());
        let draft = self
            .drafts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::RequestFailed("no draft scripted".to_string())));
        let delay = self.delays.lock().unwrap().pop_front().unwrap_or(Duration::ZERO);
        tokio::time::sleep(delay).await;
        draft
    }
}

pub fn article(content: &str) -> Article {
    Article {
        title: "タイトル".to_string(),
        content: content.to_string(),
        meta_description: "概要".to_string(),
    }
}

pub fn context(
    store: Arc<MemoryStore>,
    research: Arc<dyn ResearchProvider>,
    seo: Option<Arc<dyn SeoProvider>>,
    writer: Arc<dyn ArticleWriter>,
) -> StageContext {
    let store: Arc<dyn PipelineStore> = store;
    StageContext {
        store,
        providers: Providers {
            research,
            seo,
            writer,
        },
        config: PipelineConfig::default(),
        catalog: LinkCatalog::habitto(),
    }
}
