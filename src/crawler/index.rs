//! Newest-first index crawl with early stop
//!
//! The index is ordered by publication time, newest first. Pages are walked
//! from page 1 and the walk stops at the first page whose oldest listing is
//! already known to the store: everything after it is older still.

use crate::config::IndexConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::listing::extract_listings;
use crate::markup::CompiledContract;
use crate::record::CandidateRecord;
use crate::storage::Store;
use crate::{KakurizerError, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::Instrument;

/// What to do with a listing that fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedListingPolicy {
    /// Abort the crawl with the listing's parse error
    #[default]
    FailRun,
    /// Log the listing and carry on with the rest of the page
    SkipAndWarn,
}

/// Result of a scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub pages_fetched: u32,
    pub discovered: usize,
    pub saved: usize,
    pub skipped_listings: usize,
}

/// Records found by one walk of the index
#[derive(Debug, Default)]
struct Discovery {
    records: Vec<CandidateRecord>,
    pages_fetched: u32,
    skipped_listings: usize,
}

/// Walks the puzzle index looking for puzzles the store does not know yet
pub struct IndexCrawler<F: Fetcher> {
    fetcher: F,
    contract: Arc<CompiledContract>,
    base_url: String,
    max_pages: Option<u32>,
    policy: MalformedListingPolicy,
    span: tracing::Span,
}

impl<F: Fetcher> IndexCrawler<F> {
    /// Creates a crawler for the configured index
    pub fn new(fetcher: F, config: &IndexConfig, contract: Arc<CompiledContract>) -> Self {
        let policy = if config.skip_malformed_listings {
            MalformedListingPolicy::SkipAndWarn
        } else {
            MalformedListingPolicy::FailRun
        };

        Self {
            fetcher,
            contract,
            base_url: config.base_url.clone(),
            max_pages: config.max_pages,
            policy,
            span: tracing::info_span!("index_crawler"),
        }
    }

    /// Replaces the span every crawl is recorded under
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    pub fn policy(&self) -> MalformedListingPolicy {
        self.policy
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns every puzzle on the index that the store does not hold yet
    ///
    /// Records are newest first and contain no duplicates. A failed page fetch
    /// is fatal, as is a malformed listing unless the crawler skips them.
    pub async fn discover_new<S: Store + ?Sized>(&self, store: &S) -> Result<Vec<CandidateRecord>> {
        let discovery = self.discover(store).instrument(self.span.clone()).await?;
        Ok(discovery.records)
    }

    /// Discovers new puzzles and saves them to the store
    pub async fn scan<S: Store + ?Sized>(&self, store: &mut S) -> Result<ScanOutcome> {
        let span = self.span.clone();

        async move {
            let discovery = self.discover(&*store).await?;
            tracing::info!("Found {} new puzzles", discovery.records.len());

            let saved = if discovery.records.is_empty() {
                0
            } else {
                store.insert_new(&discovery.records)?
            };

            Ok(ScanOutcome {
                pages_fetched: discovery.pages_fetched,
                discovered: discovery.records.len(),
                saved,
                skipped_listings: discovery.skipped_listings,
            })
        }
        .instrument(span)
        .await
    }

    async fn discover<S: Store + ?Sized>(&self, store: &S) -> Result<Discovery> {
        let mut discovery = Discovery::default();
        let mut seen = HashSet::new();
        let mut page = 1;

        loop {
            if let Some(max_pages) = self.max_pages {
                if page > max_pages {
                    tracing::warn!(
                        "Stopped after {} index pages without reaching known puzzles",
                        max_pages
                    );
                    break;
                }
            }

            let html = self.fetcher.fetch_page(&self.base_url, page).await?;
            discovery.pages_fetched += 1;

            let records = self.parse_page(page, &html, &mut discovery.skipped_listings)?;
            if records.is_empty() {
                tracing::info!("Index page {} has no listings, stopping", page);
                break;
            }

            let (min_id, max_id) = records
                .iter()
                .fold((i64::MAX, i64::MIN), |(lo, hi), r| (lo.min(r.id), hi.max(r.id)));
            let known = store.query_existing_ids(min_id, max_id)?;

            let listed = records.len();
            let mut new_on_page = 0;
            let mut last_is_new = false;
            for record in records {
                // A puzzle can slide onto the next page while the crawl runs
                last_is_new = !known.contains(&record.id) && seen.insert(record.id);
                if last_is_new {
                    new_on_page += 1;
                    discovery.records.push(record);
                }
            }

            tracing::debug!(
                "Index page {}: {} listings, {} new",
                page,
                listed,
                new_on_page
            );

            if !last_is_new {
                break;
            }
            page += 1;
        }

        Ok(discovery)
    }

    /// Parses one index page, applying the malformed listing policy
    fn parse_page(
        &self,
        page: u32,
        html: &str,
        skipped: &mut usize,
    ) -> Result<Vec<CandidateRecord>> {
        let mut records = Vec::new();

        for result in extract_listings(html, &self.contract) {
            match result {
                Ok(record) => records.push(record),
                Err(source) => match self.policy {
                    MalformedListingPolicy::FailRun => {
                        return Err(KakurizerError::Listing { page, source });
                    }
                    MalformedListingPolicy::SkipAndWarn => {
                        tracing::warn!("Skipping listing on index page {}: {}", page, source);
                        *skipped += 1;
                    }
                },
            }
        }

        Ok(records)
    }
}
