//! State module for the crawl data model
//!
//! # Components
//!
//! - `CrawlState`: lifecycle of a whole run (idle, running, and its terminal states)
//! - `ScrapeOutcome`: the result of processing one candidate link
//! - `LanguageSupport`: interface/audio/subtitle flags for one product and language

mod crawl_state;
mod outcome;

// Re-export main types
pub use crawl_state::CrawlState;
pub use outcome::{InaccessibleReason, LanguageSupport, ScrapeOutcome};
