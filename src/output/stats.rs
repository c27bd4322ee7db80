//! Statistics generation from the puzzle database
//!
//! This module provides functionality for extracting and displaying
//! collection statistics from the storage layer.

use crate::record::Difficulty;
use crate::storage::{RunKind, RunRecord, Store};
use crate::Result;
use std::collections::HashMap;
use std::fmt::Write;

/// Puzzle collection summary
#[derive(Debug, Clone)]
pub struct PuzzleStatistics {
    /// Total number of puzzles stored
    pub total_puzzles: u64,

    /// Puzzles that carry an image
    pub enriched: u64,

    /// Count of puzzles by difficulty
    pub by_difficulty: HashMap<Difficulty, u64>,

    pub last_scan: Option<RunRecord>,
    pub last_enrichment: Option<RunRecord>,
}

impl PuzzleStatistics {
    /// Puzzles still waiting for an image
    pub fn pending(&self) -> u64 {
        self.total_puzzles.saturating_sub(self.enriched)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
pub fn load_statistics(storage: &dyn Store) -> Result<PuzzleStatistics> {
    Ok(PuzzleStatistics {
        total_puzzles: storage.count_puzzles()?,
        enriched: storage.count_enriched()?,
        by_difficulty: storage.count_by_difficulty()?,
        last_scan: storage.get_latest_run(RunKind::Scan)?,
        last_enrichment: storage.get_latest_run(RunKind::Enrichment)?,
    })
}

/// Formats statistics as a plain-text report
pub fn render_statistics(stats: &PuzzleStatistics) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Puzzle Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Total puzzles: {}", stats.total_puzzles);
    let _ = writeln!(out, "  With image: {}", stats.enriched);
    let _ = writeln!(out, "  Awaiting image: {}", stats.pending());
    let _ = writeln!(out);

    let _ = writeln!(out, "Puzzles by Difficulty:");
    for difficulty in Difficulty::ALL {
        let count = stats.by_difficulty.get(&difficulty).copied().unwrap_or(0);
        let percentage = if stats.total_puzzles > 0 {
            (count as f64 / stats.total_puzzles as f64) * 100.0
        } else {
            0.0
        };
        let _ = writeln!(out, "  {}: {} ({:.1}%)", difficulty, count, percentage);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Last Runs:");
    for (label, run) in [("Scan", &stats.last_scan), ("Enrichment", &stats.last_enrichment)] {
        match run {
            Some(run) => {
                let _ = writeln!(
                    out,
                    "  {}: #{} {} at {} ({} processed, {} failed)",
                    label,
                    run.id,
                    run.status.to_db_string(),
                    run.finished_at.as_deref().unwrap_or(&run.started_at),
                    run.processed,
                    run.failed
                );
            }
            None => {
                let _ = writeln!(out, "  {}: never", label);
            }
        }
    }

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &PuzzleStatistics) {
    print!("{}", render_statistics(stats));
}
