//! Catalog module: what the storefront looks like from the outside
//!
//! This module knows the store's language vocabulary, how search listing
//! URLs are formed, and which listing anchors count as product candidates.

mod languages;
mod search;

pub use languages::{Language, LANGUAGES};
pub use search::{parse_search_page, CandidateLink, SearchPage, SearchQuery};
