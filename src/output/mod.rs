//! Output module for crawl results
//!
//! This module handles:
//! - Per-language CSV partitions and the inaccessible-page partition
//! - The sink trait crawl tasks write through
//! - The end-of-run report

mod csv_sink;
pub mod stats;
mod traits;

pub use csv_sink::{partition_path, CsvResultSink, INACCESSIBLE_FILE};
pub use stats::{print_report, CrawlReport};
pub use traits::{OutputError, OutputResult, ResultSink};
