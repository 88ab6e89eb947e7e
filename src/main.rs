//! Lingo-Sweep main entry point
//!
//! This is the command-line interface for the storefront language-support
//! crawler.

use anyhow::Context;
use clap::Parser;
use lingo_sweep::config::{load_config_with_hash, Config};
use lingo_sweep::crawler::crawl;
use lingo_sweep::output::print_report;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Lingo-Sweep: which games speak your language?
///
/// Lingo-Sweep walks the storefront search listing filtered to the requested
/// languages, reads each game's language table and writes one CSV file per
/// language plus `inaccessible.csv` for pages it could not read.
#[derive(Parser, Debug)]
#[command(name = "lingo-sweep")]
#[command(version)]
#[command(about = "Storefront language-support crawler", long_about = None)]
struct Cli {
    /// Directory receiving the CSV files
    #[arg(short, long, value_name = "DIR")]
    output_directory: Option<PathBuf>,

    /// Language to track, by search key or table label (repeatable)
    #[arg(short, long = "language", value_name = "NAME")]
    languages: Vec<String>,

    /// Number of games to process
    #[arg(short = 'c', long, value_name = "N")]
    max_games: Option<u64>,

    /// Number of concurrent workers
    #[arg(short, long, value_name = "N")]
    workers: Option<u32>,

    /// Stop after this many listing pages
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Listing page to start from
    #[arg(long, value_name = "N")]
    start_page: Option<u32>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lingo_sweep=info,warn"),
            1 => EnvFilter::new("lingo_sweep=debug,info"),
            2 => EnvFilter::new("lingo_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight games");
            on_signal.cancel();
        }
    });

    let report = crawl(&config, cancel).await.context("crawl could not start")?;

    if !cli.quiet {
        print_report(&report);
    }

    Ok(ExitCode::from(report.state.exit_code()))
}

/// Command-line flags take precedence over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(dir) = &cli.output_directory {
        config.output.directory = dir.clone();
    }
    if !cli.languages.is_empty() {
        config.languages = cli.languages.clone();
    }
    if let Some(max_games) = cli.max_games {
        config.crawler.max_games = max_games;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if cli.max_pages.is_some() {
        config.crawler.max_pages = cli.max_pages;
    }
    if let Some(start_page) = cli.start_page {
        config.crawler.start_page = start_page;
    }
}
