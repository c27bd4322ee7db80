//! Kakurizer main entry point
//!
//! This is the command-line interface for the Kakurizer puzzle collector.

use anyhow::Context;
use clap::Parser;
use kakurizer::config::{load_config_with_hash, Config};
use kakurizer::crawler::{run_scan, HttpFetcher, IndexCrawler};
use kakurizer::enrich::{run_enrichment, EnrichmentWorker};
use kakurizer::markup::CompiledContract;
use kakurizer::output::{load_statistics, print_statistics};
use kakurizer::storage::open_storage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Kakurizer: collects Kakuro puzzles and their images
///
/// Kakurizer walks a puzzle index newest-first, stops as soon as it reaches
/// puzzles it already has, and then downloads the image for every stored
/// puzzle that does not have one yet.
#[derive(Parser, Debug)]
#[command(name = "kakurizer")]
#[command(version = "1.0.0")]
#[command(about = "Incremental Kakuro puzzle collector", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Only look for new puzzles on the index
    #[arg(long, conflicts_with_all = ["enrich_only", "dry_run", "stats"])]
    scan_only: bool,

    /// Only fetch images for puzzles already stored
    #[arg(long, conflicts_with_all = ["scan_only", "dry_run", "stats"])]
    enrich_only: bool,

    /// Validate config and show what would run without fetching anything
    #[arg(long, conflicts_with_all = ["scan_only", "enrich_only", "stats"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["scan_only", "enrich_only", "dry_run"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context(format!("invalid configuration {}", cli.config.display()));
        }
    };

    let result = if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_run(&config, &config_hash, !cli.enrich_only, !cli.scan_only).await
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kakurizer=info,warn"),
            1 => EnvFilter::new("kakurizer=debug,info"),
            2 => EnvFilter::new("kakurizer=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Kakurizer Dry Run ===\n");

    println!("Index:");
    println!("  Base URL: {}", config.index.base_url);
    println!("  First page: {}1", config.index.base_url);
    match config.index.max_pages {
        Some(max) => println!("  Max pages per scan: {}", max),
        None => println!("  Max pages per scan: unlimited"),
    }
    println!(
        "  Malformed listings: {}",
        if config.index.skip_malformed_listings {
            "skipped with a warning"
        } else {
            "fail the scan"
        }
    );

    println!("\nEnrichment:");
    println!(
        "  Max concurrent enrichments: {}",
        config.enrichment.max_concurrent_enrichments
    );

    println!("\nHTTP:");
    println!("  Request timeout: {}s", config.http.request_timeout_secs);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Max batch size: {}", config.storage.max_batch_size);

    println!("\nMarkup contract v{}:", config.markup.version);
    println!("  Listing: {}[{}]", config.markup.item_element, config.markup.identity_attribute);
    println!("  Title: {}", config.markup.title_selector);
    println!("  Image sources: {}", config.markup.source_selector);

    println!("\n✓ Configuration is valid");
    println!("✓ Would scan the index, then fetch images for new puzzles");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(
        Path::new(&config.output.database_path),
        config.storage.max_batch_size,
    )
    .context("failed to open database")?;

    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Scans the index and/or enriches stored puzzles
async fn handle_run(
    config: &Config,
    config_hash: &str,
    scan: bool,
    enrich: bool,
) -> anyhow::Result<()> {
    let mut storage = open_storage(
        Path::new(&config.output.database_path),
        config.storage.max_batch_size,
    )
    .with_context(|| format!("failed to open database {}", config.output.database_path))?;

    let contract = Arc::new(CompiledContract::compile(&config.markup)?);
    let fetcher = HttpFetcher::new(&config.user_agent, &config.http)
        .context("failed to build HTTP client")?;

    if scan {
        let crawler = IndexCrawler::new(fetcher.clone(), &config.index, Arc::clone(&contract))
            .with_span(tracing::info_span!("scan", index = %config.index.base_url));

        let outcome = run_scan(&crawler, &mut storage, config_hash)
            .await
            .context("index scan failed")?;
        tracing::info!(
            "Scan finished: {} new puzzles from {} pages",
            outcome.saved,
            outcome.pages_fetched
        );
    }

    if enrich {
        let site_base = Url::parse(&config.index.base_url)?;
        let worker = EnrichmentWorker::new(fetcher, &config.enrichment, contract)
            .with_site_base(site_base)
            .with_span(tracing::info_span!("enrich"));

        let outcome = run_enrichment(&worker, &mut storage, config_hash)
            .await
            .context("enrichment failed")?;
        if outcome.failed() > 0 {
            tracing::warn!(
                "{} puzzles could not be enriched and remain pending",
                outcome.failed()
            );
        }
    }

    Ok(())
}
