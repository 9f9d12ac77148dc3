//! Content post-processing
//!
//! Passes applied to the final draft, in order:
//! 1. Duplicate internal links are unlinked (first occurrence wins)
//! 2. Pushy calls-to-action are removed or softened
//! 3. Mandatory brand phrases are counted (report only, never blocks)

mod brand;
mod dedupe;
mod soften;

pub use brand::{BRAND_REQUIREMENTS, BrandCheck, BrandReport, BrandRequirement, validate_brand_keywords};
pub use dedupe::dedupe_links;
pub use soften::soften_promotional_phrasing;

use crate::links::LinkCatalog;

/// Output of the full post-processing run
#[derive(Debug, Clone)]
pub struct PostProcessed {
    pub content: String,
    pub removed_duplicate_links: usize,
    pub softened_phrases: usize,
    pub brand: BrandReport,
}

/// Run all passes over `content`
pub fn post_process(content: &str, catalog: &LinkCatalog) -> PostProcessed {
    let (deduped, removed_duplicate_links) = dedupe_links(content, catalog);
    let (softened, softened_phrases) = soften_promotional_phrasing(&deduped);
    let brand = validate_brand_keywords(&softened, BRAND_REQUIREMENTS);

    PostProcessed {
        content: softened,
        removed_duplicate_links,
        softened_phrases,
        brand,
    }
}
