//! Quill Content
//!
//! Pure text algorithms applied to generated articles:
//! - SEO scoring against a ranked term list
//! - Internal link catalog, placement and extraction
//! - Post-processing (link deduplication, phrasing softening, brand checks)
//!
//! Nothing in this crate performs I/O; every function is deterministic.

pub mod links;
pub mod postprocess;
pub mod scoring;
pub mod text;

pub use links::{LinkCatalog, LinkInsertion, LinkPage, PlacerOptions, apply_insertions, place_links};
pub use postprocess::{BrandReport, PostProcessed, post_process};
pub use scoring::{SeoScore, score};
