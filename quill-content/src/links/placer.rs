//! Link placement
//!
//! Chooses which paragraphs of a draft receive which catalog links.
//! Candidates are ordered by (page priority, paragraph position) and taken
//! greedily: every URL at most once, and from the third link on each new
//! link must sit at least `spacing` paragraphs away from all earlier ones.

use std::collections::HashSet;

use serde::Serialize;

use super::catalog::LinkCatalog;
use crate::text::{PARAGRAPH_SEPARATOR, paragraphs};

/// Number of links placed before the spacing rule applies
const UNSPACED_LINKS: usize = 2;

/// Tunables for link placement
#[derive(Debug, Clone)]
pub struct PlacerOptions {
    pub max_links: usize,
    /// Paragraphs shorter than this (in characters) never receive a link
    pub min_paragraph_chars: usize,
    /// Minimum paragraph distance between links after the first two
    pub spacing: usize,
}

impl Default for PlacerOptions {
    fn default() -> Self {
        Self {
            max_links: 5,
            min_paragraph_chars: 40,
            spacing: 3,
        }
    }
}

/// A chosen link: wrap the first occurrence of `anchor` in paragraph
/// `paragraph` with a link to `url`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkInsertion {
    pub paragraph: usize,
    pub anchor: String,
    pub url: String,
}

struct Candidate<'a> {
    paragraph: usize,
    priority: u8,
    anchor: &'a str,
    url: &'a str,
}

/// Choose link insertions for `content`
pub fn place_links(
    content: &str,
    catalog: &LinkCatalog,
    options: &PlacerOptions,
) -> Vec<LinkInsertion> {
    let mut candidates = Vec::new();

    for (index, paragraph) in paragraphs(content).into_iter().enumerate() {
        if !is_linkable(paragraph, options.min_paragraph_chars) {
            continue;
        }
        for page in &catalog.pages {
            for keyword in &page.keywords {
                if !keyword.is_empty() && paragraph.contains(keyword.as_str()) {
                    candidates.push(Candidate {
                        paragraph: index,
                        priority: page.priority,
                        anchor: keyword,
                        url: &page.url,
                    });
                }
            }
        }
    }

    // Stable sort keeps catalog order between equal keys
    candidates.sort_by_key(|c| (c.priority, c.paragraph));

    let mut used_urls = HashSet::new();
    let mut selected: Vec<LinkInsertion> = Vec::new();

    for candidate in candidates {
        if selected.len() >= options.max_links {
            break;
        }
        if used_urls.contains(candidate.url) {
            continue;
        }
        if selected.len() >= UNSPACED_LINKS
            && selected
                .iter()
                .any(|s| s.paragraph.abs_diff(candidate.paragraph) < options.spacing)
        {
            continue;
        }
        // Two anchors in one paragraph must not overlap or the second
        // replacement would land inside the first link
        if selected.iter().any(|s| {
            s.paragraph == candidate.paragraph
                && (s.anchor.contains(candidate.anchor) || candidate.anchor.contains(&s.anchor))
        }) {
            continue;
        }

        used_urls.insert(candidate.url);
        selected.push(LinkInsertion {
            paragraph: candidate.paragraph,
            anchor: candidate.anchor.to_string(),
            url: candidate.url.to_string(),
        });
    }

    selected
}

/// Apply insertions by replacing the first occurrence of each anchor in its
/// paragraph with a markdown link
pub fn apply_insertions(content: &str, insertions: &[LinkInsertion]) -> String {
    let mut parts: Vec<String> = paragraphs(content).into_iter().map(String::from).collect();

    for insertion in insertions {
        if let Some(paragraph) = parts.get_mut(insertion.paragraph) {
            let link = format!("[{}]({})", insertion.anchor, insertion.url);
            *paragraph = paragraph.replacen(&insertion.anchor, &link, 1);
        }
    }

    parts.join(PARAGRAPH_SEPARATOR)
}

fn is_linkable(paragraph: &str, min_chars: usize) -> bool {
    let trimmed = paragraph.trim();
    if trimmed.starts_with('#') || trimmed.contains("](") || trimmed.contains("<a ") {
        return false;
    }
    trimmed.chars().count() >= min_chars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::LinkPage;

    fn options() -> PlacerOptions {
        PlacerOptions {
            max_links: 5,
            min_paragraph_chars: 10,
            spacing: 3,
        }
    }

    fn catalog() -> LinkCatalog {
        LinkCatalog::new(
            "https://site.test",
            vec![
                LinkPage::new("https://site.test/service", &["alpha"], 1),
                LinkPage::new("https://site.test/guide", &["beta"], 2),
                LinkPage::new("https://site.test/faq", &["gamma"], 3),
                LinkPage::new("https://site.test/misc", &["delta"], 3),
            ],
        )
    }

    fn doc(paragraphs: &[&str]) -> String {
        paragraphs.join("\n\n")
    }

    #[test]
    fn test_never_reuses_a_url() {
        let content = doc(&[
            "alpha appears in this paragraph",
            "alpha appears again right here",
            "and alpha a third time here too",
        ]);

        let insertions = place_links(&content, &catalog(), &options());

        assert_eq!(insertions.len(), 1);
        assert_eq!(insertions[0].paragraph, 0);
    }

    #[test]
    fn test_respects_max_links() {
        let content = doc(&[
            "alpha beta gamma delta paragraph zero",
            "filler paragraph number one here",
            "filler paragraph number two here",
            "filler paragraph number three here",
            "filler paragraph number four here",
        ]);
        let options = PlacerOptions {
            max_links: 2,
            ..options()
        };

        let insertions = place_links(&content, &catalog(), &options);

        assert_eq!(insertions.len(), 2);
        let urls: Vec<_> = insertions.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://site.test/service", "https://site.test/guide"]);
    }

    #[test]
    fn test_spacing_applies_after_first_two_links() {
        let content = doc(&[
            "alpha in the opening paragraph",
            "beta in the second paragraph",
            "gamma in the third paragraph",
            "filler paragraph without terms",
            "delta in the fifth paragraph",
        ]);

        let insertions = place_links(&content, &catalog(), &options());

        let placed: Vec<_> = insertions.iter().map(|i| (i.paragraph, i.anchor.as_str())).collect();
        // gamma (paragraph 2) is too close to paragraph 0 and 1; delta at 4 is 3 away from 1
        assert_eq!(placed, vec![(0, "alpha"), (1, "beta"), (4, "delta")]);
    }

    #[test]
    fn test_orders_by_priority_then_position() {
        let content = doc(&[
            "gamma sits in the first paragraph",
            "alpha sits in the second paragraph",
        ]);

        let insertions = place_links(&content, &catalog(), &options());

        assert_eq!(insertions[0].anchor, "alpha");
        assert_eq!(insertions[1].anchor, "gamma");
    }

    #[test]
    fn test_skips_short_headings_and_linked_paragraphs() {
        let content = doc(&[
            "## alpha heading that is long enough",
            "alpha",
            "[beta](https://site.test/guide) already linked paragraph",
            "gamma in a plain long paragraph",
        ]);

        let insertions = place_links(&content, &catalog(), &options());

        assert_eq!(insertions.len(), 1);
        assert_eq!(insertions[0].anchor, "gamma");
    }

    #[test]
    fn test_overlapping_anchors_not_placed_in_same_paragraph() {
        let catalog = LinkCatalog::new(
            "https://site.test",
            vec![
                LinkPage::new("https://site.test/a", &["貯金"], 1),
                LinkPage::new("https://site.test/b", &["先取り貯金"], 2),
            ],
        );
        let content = "先取り貯金で毎月の貯金を自動化する方法について説明します";

        let insertions = place_links(content, &catalog, &options());

        assert_eq!(insertions.len(), 1);
        assert_eq!(insertions[0].url, "https://site.test/a");
    }

    #[test]
    fn test_apply_insertions_replaces_first_occurrence_only() {
        let content = doc(&["intro paragraph", "alpha and alpha again"]);
        let insertions = vec![LinkInsertion {
            paragraph: 1,
            anchor: "alpha".to_string(),
            url: "https://site.test/service".to_string(),
        }];

        let linked = apply_insertions(&content, &insertions);

        assert_eq!(
            linked,
            "intro paragraph\n\n[alpha](https://site.test/service) and alpha again"
        );
    }
}
