//! Link catalog
//!
//! Candidate pages for internal linking. Priority 1 is a service page; larger
//! numbers are lower priority.

use serde::Serialize;

/// A page that may receive internal links
#[derive(Debug, Clone, Serialize)]
pub struct LinkPage {
    pub url: String,
    pub keywords: Vec<String>,
    pub priority: u8,
}

impl LinkPage {
    pub fn new(url: &str, keywords: &[&str], priority: u8) -> Self {
        Self {
            url: url.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            priority,
        }
    }
}

/// Site pages available for linking
#[derive(Debug, Clone, Serialize)]
pub struct LinkCatalog {
    /// Links starting with this prefix (or with `/`) are internal
    pub base_url: String,
    pub pages: Vec<LinkPage>,
}

impl LinkCatalog {
    pub fn new(base_url: impl Into<String>, pages: Vec<LinkPage>) -> Self {
        Self {
            base_url: normalize_url(&base_url.into()).to_string(),
            pages,
        }
    }

    /// The Habitto site catalog used for generated articles
    pub fn habitto() -> Self {
        Self::new(
            "https://www.habitto.com",
            vec![
                LinkPage::new(
                    "https://www.habitto.com/ja/savings-account/",
                    &["普通預金", "貯金", "金利"],
                    1,
                ),
                LinkPage::new(
                    "https://www.habitto.com/ja/advisor/",
                    &["ファイナンシャルアドバイザー", "お金の相談"],
                    1,
                ),
                LinkPage::new(
                    "https://www.habitto.com/ja/debit-card/",
                    &["デビットカード", "キャッシュバック"],
                    1,
                ),
                LinkPage::new(
                    "https://www.habitto.com/ja/blog/saving-tips/",
                    &["節約", "固定費", "家計管理"],
                    2,
                ),
                LinkPage::new(
                    "https://www.habitto.com/ja/blog/emergency-fund/",
                    &["生活防衛資金", "緊急資金"],
                    2,
                ),
                LinkPage::new(
                    "https://www.habitto.com/ja/blog/nisa/",
                    &["新NISA", "積立投資", "投資信託"],
                    2,
                ),
                LinkPage::new(
                    "https://www.habitto.com/ja/blog/household-budget/",
                    &["家計簿", "先取り貯金"],
                    3,
                ),
                LinkPage::new(
                    "https://www.habitto.com/ja/faq/",
                    &["よくある質問", "手数料"],
                    3,
                ),
            ],
        )
    }

    /// True when `url` points at this site
    pub fn is_internal(&self, url: &str) -> bool {
        url.starts_with('/') || url.starts_with(&self.base_url)
    }
}

/// Strip a trailing slash so `/a/` and `/a` compare equal
pub fn normalize_url(url: &str) -> &str {
    let trimmed = url.trim();
    if trimmed.len() > 1 {
        trimmed.trim_end_matches('/')
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("https://a.com/x/"), "https://a.com/x");
        assert_eq!(normalize_url("https://a.com/x"), "https://a.com/x");
        assert_eq!(normalize_url("/"), "/");
    }

    #[test]
    fn test_is_internal() {
        let catalog = LinkCatalog::habitto();
        assert!(catalog.is_internal("https://www.habitto.com/ja/faq/"));
        assert!(catalog.is_internal("/ja/faq"));
        assert!(!catalog.is_internal("https://example.com/"));
    }

    #[test]
    fn test_habitto_catalog_urls_are_unique() {
        let catalog = LinkCatalog::habitto();
        let mut urls: Vec<_> = catalog.pages.iter().map(|p| p.url.as_str()).collect();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), catalog.pages.len());
    }
}
