//! Internal link deduplication

use std::collections::HashSet;

use regex::Captures;

use crate::links::{LinkCatalog, MARKDOWN_LINK, normalize_url};

/// Keep the first link to each internal URL; later links to the same URL
/// lose their markup but keep their anchor text.
///
/// Returns the new text and the number of links unwrapped.
pub fn dedupe_links(content: &str, catalog: &LinkCatalog) -> (String, usize) {
    let mut seen = HashSet::new();
    let mut removed = 0;

    let result = MARKDOWN_LINK.replace_all(content, |caps: &Captures| {
        let url = normalize_url(&caps[2]);
        if !catalog.is_internal(url) || seen.insert(url.to_string()) {
            return caps[0].to_string();
        }
        removed += 1;
        caps[1].to_string()
    });

    (result.into_owned(), removed)
}
