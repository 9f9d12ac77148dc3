//! Internal links
//!
//! The catalog of linkable site pages, the placement algorithm that decides
//! where links go in a draft, and extraction of the links already present.

mod catalog;
mod extract;
mod placer;

pub use catalog::{LinkCatalog, LinkPage, normalize_url};
pub use extract::{MARKDOWN_LINK, extract_internal_links};
pub use placer::{LinkInsertion, PlacerOptions, apply_insertions, place_links};
