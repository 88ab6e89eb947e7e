//! Run report produced when a crawl ends
//!
//! This module provides the summary a scheduler hands back to its caller
//! and a printer for the command line.

use crate::state::{CrawlState, InaccessibleReason};
use crate::SweepError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Summary of one crawl run
#[derive(Debug)]
pub struct CrawlReport {
    /// Terminal state of the run
    pub state: CrawlState,

    /// Units of work that reached the sink (accessible + inaccessible)
    pub processed: u64,

    /// Products whose language table was read
    pub accessible: u64,

    /// Inaccessible products by reason
    pub inaccessible: HashMap<InaccessibleReason, u64>,

    /// Listing pages fetched
    pub pages_fetched: u64,

    /// Listing rows that did not name a product detail page
    pub skipped_links: u64,

    /// Candidates seen earlier in the same run
    pub duplicate_links: u64,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// The fatal error behind an aborted run
    pub error: Option<SweepError>,
}

impl CrawlReport {
    /// Total number of inaccessible products
    pub fn inaccessible_total(&self) -> u64 {
        self.inaccessible.values().sum()
    }

    /// Number of inaccessible products for one reason
    pub fn inaccessible_count(&self, reason: InaccessibleReason) -> u64 {
        self.inaccessible.get(&reason).copied().unwrap_or(0)
    }

    /// Share of processed products whose language table was read
    pub fn accessible_rate(&self) -> f64 {
        if self.processed == 0 {
            return 0.0;
        }
        (self.accessible as f64 / self.processed as f64) * 100.0
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Sweep Report ===\n");

    println!("Run:");
    println!("  State: {}", report.state);
    println!("  Started: {}", report.started_at.to_rfc3339());
    println!("  Finished: {}", report.finished_at.to_rfc3339());
    println!("  Duration: {}s", report.duration_seconds());
    println!();

    println!("Listing:");
    println!("  Pages fetched: {}", report.pages_fetched);
    println!("  Rows skipped (bundles, packages): {}", report.skipped_links);
    println!("  Duplicate candidates: {}", report.duplicate_links);
    println!();

    println!("Products:");
    println!("  Processed: {}", report.processed);
    println!(
        "  Accessible: {} ({:.1}%)",
        report.accessible,
        report.accessible_rate()
    );
    println!("  Inaccessible: {}", report.inaccessible_total());

    let mut reasons: Vec<_> = report.inaccessible.iter().collect();
    reasons.sort_by(|a, b| b.1.cmp(a.1));
    for (reason, count) in reasons {
        println!("    {}: {}", reason, count);
    }

    if let Some(error) = &report.error {
        println!();
        println!("Error: {}", error);
    }
}
