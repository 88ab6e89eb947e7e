//! Configuration module for Lingo-Sweep
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every setting has a default, so a run can be configured entirely
//! from the command line.
//!
//! # Example
//!
//! ```no_run
//! use lingo_sweep::config::{load_config, validate};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sweep.toml")).unwrap();
//! validate(&config).unwrap();
//! println!("Scanning up to {} games", config.crawler.max_games);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CatalogConfig, Config, CrawlerConfig, HttpConfig, OutputConfig, RetryConfig,
    DEFAULT_SEARCH_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

// Re-export validation functions
pub use validation::{parse_search_url, resolve_languages, validate};
