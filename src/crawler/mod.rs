//! Crawler module for discovering new puzzles
//!
//! This module contains the discovery side of the pipeline, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - Listing extraction from index pages
//! - The newest-first index walk that stops at known puzzles

mod fetcher;
mod index;
mod listing;

pub use fetcher::{build_http_client, user_agent_string, Fetcher, HttpFetcher};
pub use index::{IndexCrawler, MalformedListingPolicy, ScanOutcome};
pub use listing::{extract_listings, is_listing_item, parse_listing, ParseError, ParseFailure};

use crate::storage::{RunKind, RunStatus, Store};
use crate::Result;

/// Runs one scan and records it as a run in the store
///
/// The run is marked failed if the scan returns an error; the error is then
/// passed on to the caller.
///
/// # Arguments
///
/// * `crawler` - The configured index crawler
/// * `store` - Where new puzzles are saved
/// * `config_hash` - Hash of the configuration file, kept with the run
pub async fn run_scan<F, S>(
    crawler: &IndexCrawler<F>,
    store: &mut S,
    config_hash: &str,
) -> Result<ScanOutcome>
where
    F: Fetcher,
    S: Store + ?Sized,
{
    let run_id = store.create_run(RunKind::Scan, config_hash)?;
    tracing::info!("Starting scan run {}", run_id);

    match crawler.scan(store).await {
        Ok(outcome) => {
            store.finish_run(
                run_id,
                RunStatus::Completed,
                outcome.saved as u64,
                outcome.skipped_listings as u64,
            )?;
            tracing::info!(
                "Scan run {} complete: {} pages, {} new puzzles saved",
                run_id,
                outcome.pages_fetched,
                outcome.saved
            );
            Ok(outcome)
        }
        Err(e) => {
            if let Err(finish_err) = store.finish_run(run_id, RunStatus::Failed, 0, 0) {
                tracing::warn!("Failed to mark scan run {} failed: {}", run_id, finish_err);
            }
            Err(e)
        }
    }
}
