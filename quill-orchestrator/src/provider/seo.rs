//! HTTP SEO-analysis client
//!
//! Talks to a NeuronWriter-style API: a query is created for a keyword, then
//! polled until the provider finishes its SERP analysis. The query ID is kept
//! as the analysis' provider handle so the final article can be imported for
//! an official score.
//!
//! Polling stops within the caller's time budget. A query that is not ready
//! by then stays pending, and the next fetch for the same keyword resumes
//! polling it instead of creating another query.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use quill_core::domain::seo::SeoAnalysis;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{ProviderError, SeoProvider};

const POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_COMPETITOR_HEADINGS: usize = 20;
const SEARCH_ENGINE: &str = "google.co.jp";
const LANGUAGE: &str = "Japanese";

pub struct HttpSeoProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    poll_interval: Duration,
    max_polls: u32,
    /// Query IDs created but not yet ready, by keyword
    pending: Mutex<HashMap<String, String>>,
}

impl HttpSeoProvider {
    /// `budget` is how long a caller waits for one fetch
    pub fn new(base_url: String, api_key: String, budget: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
            poll_interval: POLL_INTERVAL,
            max_polls: max_polls(budget, POLL_INTERVAL),
            pending: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    fn with_polling(mut self, poll_interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = poll_interval;
        self.max_polls = max_polls;
        self
    }

    /// Reuse the pending query for `keyword`, or create one
    async fn query_for(&self, keyword: &str) -> Result<String, ProviderError> {
        if let Some(query) = self.pending.lock().await.get(keyword) {
            tracing::debug!("Resuming SEO query {} for '{}'", query, keyword);
            return Ok(query.clone());
        }

        let created: NewQueryResponse = self
            .post(
                "/new-query",
                &NewQueryRequest {
                    keyword,
                    engine: SEARCH_ENGINE,
                    language: LANGUAGE,
                },
            )
            .await?;

        tracing::debug!("SEO query {} created for '{}'", created.query, keyword);
        self.pending
            .lock()
            .await
            .insert(keyword.to_string(), created.query.clone());
        Ok(created.query)
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ProviderError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: None,
            });
        }
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError { status, message });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct NewQueryRequest<'a> {
    keyword: &'a str,
    engine: &'a str,
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct NewQueryResponse {
    query: String,
}

#[derive(Debug, Serialize)]
struct GetQueryRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct GetQueryResponse {
    status: String,
    #[serde(default)]
    terms: Option<QueryTerms>,
    #[serde(default)]
    metrics: Option<QueryMetrics>,
    #[serde(default)]
    competitors: Vec<Competitor>,
}

#[derive(Debug, Deserialize)]
struct QueryTerms {
    /// Ranked most important first
    #[serde(default)]
    content_basic: Vec<Term>,
}

#[derive(Debug, Deserialize)]
struct Term {
    t: String,
}

#[derive(Debug, Deserialize)]
struct QueryMetrics {
    word_count: Option<WordCountMetric>,
}

#[derive(Debug, Deserialize)]
struct WordCountMetric {
    target: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Competitor {
    #[serde(default)]
    headers: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ImportContentRequest<'a> {
    query: &'a str,
    title: &'a str,
    description: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImportContentResponse {
    content_score: Option<u32>,
}

/// Polls that fit in `budget`, one at least
fn max_polls(budget: Duration, interval: Duration) -> u32 {
    let polls = budget.as_millis() / interval.as_millis().max(1);
    u32::try_from(polls).unwrap_or(u32::MAX).max(1)
}

fn analysis_from_response(query: &str, response: GetQueryResponse) -> SeoAnalysis {
    let terms = response
        .terms
        .map(|t| t.content_basic.into_iter().map(|term| term.t).collect())
        .unwrap_or_default();

    let target_word_count = response
        .metrics
        .and_then(|m| m.word_count)
        .and_then(|w| w.target);

    let competitor_headings = response
        .competitors
        .into_iter()
        .flat_map(|c| c.headers)
        .filter(|h| !h.trim().is_empty())
        .take(MAX_COMPETITOR_HEADINGS)
        .collect();

    SeoAnalysis {
        terms,
        target_word_count,
        competitor_headings,
        provider_handle: Some(query.to_string()),
    }
}

#[async_trait]
impl SeoProvider for HttpSeoProvider {
    async fn fetch_analysis(&self, keyword: &str) -> Result<SeoAnalysis, ProviderError> {
        let query = self.query_for(keyword).await?;

        for _ in 0..self.max_polls {
            let response: GetQueryResponse = self
                .post("/get-query", &GetQueryRequest { query: &query })
                .await?;

            if response.status == "ready" {
                self.pending.lock().await.remove(keyword);
                return Ok(analysis_from_response(&query, response));
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        Err(ProviderError::Timeout(format!(
            "SEO query {} not ready after {} polls",
            query, self.max_polls
        )))
    }

    async fn import_for_official_score(
        &self,
        provider_handle: &str,
        title: &str,
        description: &str,
        html: &str,
    ) -> Result<Option<u32>, ProviderError> {
        let response: ImportContentResponse = self
            .post(
                "/import-content",
                &ImportContentRequest {
                    query: provider_handle,
                    title,
                    description,
                    html,
                },
            )
            .await?;

        Ok(response.content_score)
    }
}
