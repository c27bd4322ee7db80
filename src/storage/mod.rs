//! Storage module for persisting puzzles
//!
//! This module handles all database operations for the pipeline, including:
//! - SQLite database initialization and schema management
//! - Batched insertion of newly discovered puzzles
//! - Known-id range queries used by the index crawler
//! - Image enrichment updates
//! - Run tracking for scans and enrichment passes

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Store, StorageError, StorageResult, DEFAULT_MAX_BATCH_SIZE};

use crate::record::{CandidateRecord, ImageFields};
use crate::KakurizerError;
use std::fmt;
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
/// * `max_batch_size` - Records written per insert transaction
pub fn open_storage(path: &Path, max_batch_size: usize) -> Result<SqliteStorage, KakurizerError> {
    Ok(SqliteStorage::new(path)?.with_max_batch_size(max_batch_size))
}

/// Opaque surrogate key of a stored puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordHandle(pub(crate) i64);

impl RecordHandle {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Represents a puzzle in the database
#[derive(Debug, Clone)]
pub struct StoredPuzzle {
    pub handle: RecordHandle,
    pub record: CandidateRecord,
    pub discovered_at: String,
    /// Present only once the puzzle has been enriched
    pub image: Option<ImageFields>,
    pub enriched_at: Option<String>,
}

impl StoredPuzzle {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// What a run did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunKind {
    /// Walked the index looking for new puzzles
    Scan,
    /// Fetched images for stored puzzles
    Enrichment,
}

impl RunKind {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Enrichment => "enrichment",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "scan" => Some(Self::Scan),
            "enrichment" => Some(Self::Enrichment),
            _ => None,
        }
    }
}

/// Represents a scan or enrichment run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub kind: RunKind,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    /// Puzzles saved (scan) or enriched (enrichment)
    pub processed: u64,
    pub failed: u64,
}

/// Status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
