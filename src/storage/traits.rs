//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::record::{CandidateRecord, Difficulty, ImageFields};
use crate::storage::{RecordHandle, RunKind, RunRecord, RunStatus, StoredPuzzle};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Maximum number of records written in a single transaction
///
/// Backends may use a smaller batch but never a larger one.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Puzzle not found: handle {0}")]
    PuzzleNotFound(i64),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The pipeline only ever adds puzzles and enriches them; nothing is deleted.
/// Locking and transactions are the backend's concern.
pub trait Store {
    // ===== Puzzles =====

    /// Maximum number of records `insert_new` writes per transaction
    fn max_batch_size(&self) -> usize;

    /// Returns the puzzle ids already stored within `[min_id, max_id]`
    fn query_existing_ids(&self, min_id: i64, max_id: i64) -> StorageResult<HashSet<i64>>;

    /// Stores newly discovered puzzles
    ///
    /// Records are written in batches of at most `max_batch_size()`, each batch
    /// in its own transaction. A surrogate handle is allocated for every
    /// record. Batching is invisible to the caller.
    ///
    /// # Returns
    ///
    /// The number of records written
    fn insert_new(&mut self, records: &[CandidateRecord]) -> StorageResult<usize>;

    /// Returns every stored puzzle that has no image yet
    fn fetch_unenriched(&self) -> StorageResult<Vec<(RecordHandle, CandidateRecord)>>;

    /// Writes all image fields of one puzzle at once
    fn update(&mut self, handle: RecordHandle, image: &ImageFields) -> StorageResult<()>;

    /// Gets a stored puzzle by handle
    fn get_puzzle(&self, handle: RecordHandle) -> StorageResult<StoredPuzzle>;

    // ===== Run Management =====

    /// Records the start of a scan or enrichment run
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, kind: RunKind, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run finished with its final status and counters
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        processed: u64,
        failed: u64,
    ) -> StorageResult<()>;

    /// Gets the most recent run of the given kind
    fn get_latest_run(&self, kind: RunKind) -> StorageResult<Option<RunRecord>>;

    // ===== Statistics =====

    /// Gets total puzzle count
    fn count_puzzles(&self) -> StorageResult<u64>;

    /// Counts puzzles that carry an image
    fn count_enriched(&self) -> StorageResult<u64>;

    /// Counts puzzles per difficulty
    fn count_by_difficulty(&self) -> StorageResult<HashMap<Difficulty, u64>>;
}
