//! Brand keyword validation

use serde::Serialize;

use crate::links::MARKDOWN_LINK;
use crate::text::count_occurrences;

/// A phrase that must appear at least `min_occurrences` times
#[derive(Debug, Clone, Copy)]
pub struct BrandRequirement {
    pub phrase: &'static str,
    pub min_occurrences: usize,
}

pub const BRAND_REQUIREMENTS: &[BrandRequirement] = &[
    BrandRequirement {
        phrase: "Habitto",
        min_occurrences: 2,
    },
    BrandRequirement {
        phrase: "ファイナンシャルアドバイザー",
        min_occurrences: 1,
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct BrandCheck {
    pub phrase: String,
    pub required: usize,
    pub found: usize,
}

impl BrandCheck {
    pub fn passed(&self) -> bool {
        self.found >= self.required
    }
}

/// Pass/fail report for the brand phrases
#[derive(Debug, Clone, Serialize)]
pub struct BrandReport {
    pub checks: Vec<BrandCheck>,
}

impl BrandReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(BrandCheck::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &BrandCheck> {
        self.checks.iter().filter(|c| !c.passed())
    }
}

/// Count brand phrases in the visible text; link URLs are ignored so the
/// site domain does not count as a brand mention.
pub fn validate_brand_keywords(content: &str, requirements: &[BrandRequirement]) -> BrandReport {
    let visible = MARKDOWN_LINK.replace_all(content, "$1");
    let checks = requirements
        .iter()
        .map(|req| BrandCheck {
            phrase: req.phrase.to_string(),
            required: req.min_occurrences,
            found: count_occurrences(&visible, req.phrase),
        })
        .collect();

    BrandReport { checks }
}
