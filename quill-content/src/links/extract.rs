//! Link extraction

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::catalog::{LinkCatalog, normalize_url};

/// Markdown inline link: `[anchor](url)`
pub static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").expect("Invalid markdown link regex")
});

/// Distinct internal link URLs in document order, normalized
pub fn extract_internal_links(content: &str, catalog: &LinkCatalog) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for caps in MARKDOWN_LINK.captures_iter(content) {
        let url = normalize_url(&caps[2]);
        if catalog.is_internal(url) && seen.insert(url.to_string()) {
            links.push(url.to_string());
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_internal_links_dedupes_and_skips_external() {
        let content = "[貯金](https://www.habitto.com/ja/savings-account/) と \
            [外部](https://example.com/) と \
            [普通預金](https://www.habitto.com/ja/savings-account)\n\n\
            [FAQ](/ja/faq/)";

        let links = extract_internal_links(content, &LinkCatalog::habitto());

        assert_eq!(
            links,
            vec!["https://www.habitto.com/ja/savings-account", "/ja/faq"]
        );
    }
}
