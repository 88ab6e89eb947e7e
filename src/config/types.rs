use serde::Deserialize;
use std::path::PathBuf;

/// Default storefront search listing
pub const DEFAULT_SEARCH_URL: &str = "https://store.steampowered.com/search/";

/// Main configuration structure for Lingo-Sweep
///
/// Every section is optional in the TOML file; command-line flags are
/// applied on top before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub retry: RetryConfig,
    pub http: HttpConfig,
    pub catalog: CatalogConfig,
    pub output: OutputConfig,

    /// Languages to look for, by search key or table label
    pub languages: Vec<String>,
}

/// Crawl scope and concurrency
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of products to process before stopping (must be set)
    pub max_games: u64,

    /// Size of the worker pool
    pub workers: u32,

    /// Optional cap on the number of listing pages requested
    pub max_pages: Option<u32>,

    /// Listing page index to start from
    pub start_page: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_games: 0,
            workers: 8,
            max_pages: None,
            start_page: 0,
        }
    }
}

/// Backoff applied to transient product-page failures
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Total attempts per URI, including the first
    pub max_attempts: u32,

    /// Wait before the first retry (milliseconds)
    pub base_delay_ms: u64,

    /// Multiplier applied to the wait after each retry
    pub factor: u32,

    /// Upper bound for a single wait (milliseconds)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            factor: 2,
            max_delay_ms: 5_000,
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("lingo-sweep/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Where the storefront lives
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CatalogConfig {
    /// Search listing URL; query parameters are replaced per page
    pub search_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one CSV file per language plus `inaccessible.csv`
    pub directory: PathBuf,
}
