//! Image enrichment for stored puzzles
//!
//! This module handles the second half of the pipeline:
//! - Scanning detail pages for image sources
//! - Choosing the image variant to download
//! - Reading image headers
//! - Writing the image fields back to the store

mod detail;
mod inspect;
mod variant;
mod worker;

pub use detail::extract_variants;
pub use inspect::{inspect, ImageInfo, UnreadableImageError};
pub use variant::{select_best, ImageVariant, NoVariantError};
pub use worker::{EnrichmentOutcome, EnrichmentWorker};

use crate::crawler::Fetcher;
use crate::record::CandidateRecord;
use crate::storage::{RunKind, RunStatus, StorageError, Store};
use crate::{FetchError, Result};
use thiserror::Error;

/// Enrichment of a single puzzle failed; nothing was written for it
#[derive(Debug, Error)]
#[error("Failed to enrich puzzle {id} ({detail_url}): {source}")]
pub struct EnrichmentError {
    pub id: i64,
    pub detail_url: String,
    pub source: EnrichmentFailure,
}

impl EnrichmentError {
    pub fn new(record: &CandidateRecord, source: EnrichmentFailure) -> Self {
        Self {
            id: record.id,
            detail_url: record.detail_url.clone(),
            source,
        }
    }
}

/// The step of enrichment that failed
#[derive(Debug, Error)]
pub enum EnrichmentFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    NoVariant(#[from] NoVariantError),

    #[error(transparent)]
    UnreadableImage(#[from] UnreadableImageError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Runs one enrichment pass and records it as a run in the store
///
/// Individual puzzle failures are counted on the run; the run itself only
/// fails if pending puzzles cannot be listed.
pub async fn run_enrichment<F, S>(
    worker: &EnrichmentWorker<F>,
    store: &mut S,
    config_hash: &str,
) -> Result<EnrichmentOutcome>
where
    F: Fetcher,
    S: Store + ?Sized,
{
    let run_id = store.create_run(RunKind::Enrichment, config_hash)?;
    tracing::info!("Starting enrichment run {}", run_id);

    match worker.enrich_pending(store).await {
        Ok(outcome) => {
            store.finish_run(
                run_id,
                RunStatus::Completed,
                outcome.enriched as u64,
                outcome.failed() as u64,
            )?;
            Ok(outcome)
        }
        Err(e) => {
            if let Err(finish_err) = store.finish_run(run_id, RunStatus::Failed, 0, 0) {
                tracing::warn!(
                    "Failed to mark enrichment run {} failed: {}",
                    run_id,
                    finish_err
                );
            }
            Err(e)
        }
    }
}
