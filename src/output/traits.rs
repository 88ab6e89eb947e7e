//! Result sink trait and output errors
//!
//! A result sink receives one [`ScrapeOutcome`] per processed candidate and
//! fans it out to the partitions it maintains.

use crate::state::ScrapeOutcome;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Output location {path} is not writable: {source}")]
    NotWritable {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for result sinks
///
/// Implementations are shared between concurrent crawl tasks and must
/// serialize writes per partition so that rows are never interleaved or lost.
pub trait ResultSink: Send + Sync {
    /// Records the outcome for one candidate
    ///
    /// Accessible outcomes produce one row per language in their support
    /// map; inaccessible outcomes produce one row in the inaccessible
    /// partition.
    ///
    /// # Arguments
    ///
    /// * `outcome` - The extracted outcome
    /// * `uri` - The candidate URI the outcome belongs to
    fn record(&self, outcome: &ScrapeOutcome, uri: &str) -> OutputResult<()>;

    /// Flushes every partition to durable storage
    fn flush(&self) -> OutputResult<()>;
}
