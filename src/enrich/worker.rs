//! Enrichment worker
//!
//! For each stored puzzle without an image: fetch its detail page, pick the
//! largest image source, fetch the image and read its header. The store is
//! only written once every step has succeeded.

use crate::config::EnrichmentConfig;
use crate::crawler::Fetcher;
use crate::enrich::detail::extract_variants;
use crate::enrich::inspect::inspect;
use crate::enrich::variant::select_best;
use crate::enrich::{EnrichmentError, EnrichmentFailure};
use crate::markup::CompiledContract;
use crate::record::{CandidateRecord, EnrichedRecord, ImageFields};
use crate::storage::{RecordHandle, Store};
use crate::url::resolve_url;
use crate::Result;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::Instrument;
use url::Url;

/// Result of one enrichment pass
#[derive(Debug, Default)]
pub struct EnrichmentOutcome {
    /// Puzzles that were pending when the pass started
    pub attempted: usize,
    pub enriched: usize,
    pub failures: Vec<EnrichmentError>,
}

impl EnrichmentOutcome {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Fetches and attaches images to stored puzzles
pub struct EnrichmentWorker<F: Fetcher> {
    fetcher: F,
    contract: Arc<CompiledContract>,
    site_base: Option<Url>,
    max_concurrent: usize,
    span: tracing::Span,
}

impl<F: Fetcher> EnrichmentWorker<F> {
    pub fn new(fetcher: F, config: &EnrichmentConfig, contract: Arc<CompiledContract>) -> Self {
        Self {
            fetcher,
            contract,
            site_base: None,
            max_concurrent: config.max_concurrent_enrichments.max(1),
            span: tracing::info_span!("enrichment_worker"),
        }
    }

    /// Sets the URL that site-relative detail links are resolved against
    pub fn with_site_base(mut self, site_base: Url) -> Self {
        self.site_base = Some(site_base);
        self
    }

    /// Replaces the span every enrichment is recorded under
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches everything a record needs without touching the store
    pub async fn prepare(
        &self,
        record: &CandidateRecord,
    ) -> std::result::Result<EnrichedRecord, EnrichmentError> {
        match self.fetch_image(record).await {
            Ok(image) => Ok(EnrichedRecord::new(record.clone(), image)),
            Err(source) => Err(EnrichmentError::new(record, source)),
        }
    }

    /// Enriches one record and writes its image fields in a single update
    pub async fn enrich<S: Store + ?Sized>(
        &self,
        store: &mut S,
        handle: RecordHandle,
        record: &CandidateRecord,
    ) -> std::result::Result<EnrichedRecord, EnrichmentError> {
        let enriched = self.prepare(record).instrument(self.span.clone()).await?;
        store
            .update(handle, &enriched.image)
            .map_err(|e| EnrichmentError::new(record, e.into()))?;
        Ok(enriched)
    }

    /// Enriches every stored puzzle that has no image yet
    ///
    /// Up to `max-concurrent-enrichments` puzzles are fetched at once, while
    /// store updates are applied one at a time. A failing puzzle is logged and
    /// counted and does not stop the others. Only a failure to list pending
    /// puzzles is returned as an error.
    pub async fn enrich_pending<S: Store + ?Sized>(&self, store: &mut S) -> Result<EnrichmentOutcome> {
        let span = self.span.clone();

        async move {
            let pending = store.fetch_unenriched()?;
            tracing::info!("{} puzzles awaiting images", pending.len());

            let mut outcome = EnrichmentOutcome {
                attempted: pending.len(),
                ..EnrichmentOutcome::default()
            };

            let mut prepared = stream::iter(pending)
                .map(|(handle, record)| async move { (handle, self.prepare(&record).await) })
                .buffer_unordered(self.max_concurrent);

            while let Some((handle, result)) = prepared.next().await {
                let applied = result.and_then(|enriched| {
                    match store.update(handle, &enriched.image) {
                        Ok(_) => Ok(enriched),
                        Err(e) => Err(EnrichmentError::new(&enriched.record, e.into())),
                    }
                });

                match applied {
                    Ok(enriched) => {
                        outcome.enriched += 1;
                        tracing::debug!(
                            "Enriched puzzle {} with {}x{} {} image",
                            enriched.id(),
                            enriched.image.width,
                            enriched.image.height,
                            enriched.image.format
                        );
                    }
                    Err(e) => {
                        tracing::warn!("{}", e);
                        outcome.failures.push(e);
                    }
                }
            }

            tracing::info!(
                "Enriched {} of {} puzzles ({} failed)",
                outcome.enriched,
                outcome.attempted,
                outcome.failed()
            );

            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    async fn fetch_image(
        &self,
        record: &CandidateRecord,
    ) -> std::result::Result<ImageFields, EnrichmentFailure> {
        let detail_url = resolve_url(self.site_base.as_ref(), &record.detail_url)?;
        let html = self.fetcher.fetch_text(detail_url.as_str()).await?;

        let variants = extract_variants(&html, &self.contract);
        let raw_image_url = select_best(&variants)?;
        let image_url = resolve_url(Some(&detail_url), &raw_image_url)?;

        let image_bytes = self.fetcher.fetch_bytes(image_url.as_str()).await?;
        let info = inspect(&image_bytes)?;

        // Absolute sources are stored exactly as the page gave them
        let stored_url = if Url::parse(&raw_image_url).is_ok() {
            raw_image_url
        } else {
            image_url.to_string()
        };

        Ok(ImageFields {
            image_url: stored_url,
            image_bytes,
            width: info.width,
            height: info.height,
            format: info.format,
        })
    }
}
