//! Lingo-Sweep: a storefront language-support crawler
//!
//! This crate walks the search listing of a web storefront, visits every
//! product page it finds, and records which of the requested languages each
//! product supports for its interface, audio, and subtitles. Results are
//! written to one CSV partition per language plus a partition for pages that
//! could not be inspected.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Lingo-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Failed to fetch search listing {uri}: {source}")]
    PaginationFetch {
        uri: String,
        source: crawler::FetchError,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Worker task failed: {0}")]
    Worker(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown language: '{0}'")]
    UnknownLanguage(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Lingo-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

// Re-export commonly used types
pub use catalog::Language;
pub use config::Config;
pub use state::{CrawlState, InaccessibleReason, LanguageSupport, ScrapeOutcome};
