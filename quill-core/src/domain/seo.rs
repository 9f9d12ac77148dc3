//! SEO analysis domain types

use serde::{Deserialize, Serialize};

/// Keyword-level SEO analysis returned by the SEO provider
///
/// `terms` is ordered by the provider's importance ranking, most important
/// first. Cached per keyword and replaced wholesale on re-fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoAnalysis {
    pub terms: Vec<String>,
    pub target_word_count: Option<u32>,
    #[serde(default)]
    pub competitor_headings: Vec<String>,
    /// Provider query handle used to request an official score later
    pub provider_handle: Option<String>,
}

impl SeoAnalysis {
    pub fn new(terms: Vec<String>) -> Self {
        Self {
            terms,
            target_word_count: None,
            competitor_headings: Vec::new(),
            provider_handle: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
