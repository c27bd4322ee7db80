//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.

use crate::record::{CandidateRecord, Difficulty, ImageFields};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Store, StorageError, StorageResult, DEFAULT_MAX_BATCH_SIZE};
use crate::storage::{RecordHandle, RunKind, RunRecord, RunStatus, StoredPuzzle};
use crate::KakurizerError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{HashMap, HashSet};
use std::path::Path;

const PUZZLE_COLUMNS: &str = "handle, puzzle_id, timestamp_millis, difficulty, page_url, discovered_at,
     has_img, img_url, img_width, img_height, img_format, img_blob, enriched_at";

const RUN_COLUMNS: &str =
    "id, kind, started_at, finished_at, config_hash, status, processed, failed";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
    max_batch_size: usize,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(KakurizerError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, KakurizerError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, KakurizerError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        })
    }

    /// Caps the number of records written per insert transaction
    ///
    /// Values are clamped to `1..=DEFAULT_MAX_BATCH_SIZE`.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.clamp(1, DEFAULT_MAX_BATCH_SIZE);
        self
    }
}

/// Raw puzzle row; difficulty is still a database string
struct PuzzleRow {
    handle: i64,
    id: i64,
    published_at_millis: i64,
    difficulty: String,
    detail_url: String,
    discovered_at: String,
    has_image: bool,
    image_url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    format: Option<String>,
    image_bytes: Option<Vec<u8>>,
    enriched_at: Option<String>,
}

impl PuzzleRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            handle: row.get(0)?,
            id: row.get(1)?,
            published_at_millis: row.get(2)?,
            difficulty: row.get(3)?,
            detail_url: row.get(4)?,
            discovered_at: row.get(5)?,
            has_image: row.get(6)?,
            image_url: row.get(7)?,
            width: row.get(8)?,
            height: row.get(9)?,
            format: row.get(10)?,
            image_bytes: row.get(11)?,
            enriched_at: row.get(12)?,
        })
    }

    fn into_stored(self) -> StorageResult<StoredPuzzle> {
        let difficulty = parse_difficulty(&self.difficulty)?;

        // Image fields are written together, so either all are present or the
        // puzzle is treated as not enriched.
        let image = match (
            self.has_image,
            self.image_url,
            self.image_bytes,
            self.width,
            self.height,
            self.format,
        ) {
            (true, Some(image_url), Some(image_bytes), Some(width), Some(height), Some(format)) => {
                Some(ImageFields {
                    image_url,
                    image_bytes,
                    width,
                    height,
                    format,
                })
            }
            _ => None,
        };

        Ok(StoredPuzzle {
            handle: RecordHandle(self.handle),
            record: CandidateRecord {
                id: self.id,
                published_at_millis: self.published_at_millis,
                detail_url: self.detail_url,
                difficulty,
            },
            discovered_at: self.discovered_at,
            image,
            enriched_at: self.enriched_at,
        })
    }
}

fn parse_difficulty(value: &str) -> StorageResult<Difficulty> {
    Difficulty::from_db_string(value)
        .ok_or_else(|| StorageError::Serialization(format!("Unknown difficulty '{}'", value)))
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        kind: RunKind::from_db_string(&row.get::<_, String>(1)?).unwrap_or(RunKind::Scan),
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Failed),
        processed: row.get::<_, i64>(6)? as u64,
        failed: row.get::<_, i64>(7)? as u64,
    })
}

impl Store for SqliteStorage {
    // ===== Puzzles =====

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    fn query_existing_ids(&self, min_id: i64, max_id: i64) -> StorageResult<HashSet<i64>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT puzzle_id FROM puzzles WHERE puzzle_id >= ?1 AND puzzle_id <= ?2")?;

        let ids = stmt
            .query_map(params![min_id, max_id], |row| row.get(0))?
            .collect::<Result<HashSet<i64>, _>>()?;

        Ok(ids)
    }

    fn insert_new(&mut self, records: &[CandidateRecord]) -> StorageResult<usize> {
        let mut saved = 0;

        for batch in records.chunks(self.max_batch_size) {
            let now = Utc::now().to_rfc3339();
            let tx = self.conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO puzzles (puzzle_id, timestamp_millis, difficulty, page_url, discovered_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;
                for record in batch {
                    stmt.execute(params![
                        record.id,
                        record.published_at_millis,
                        record.difficulty.to_db_string(),
                        record.detail_url,
                        now
                    ])
                    .map_err(|e| match e {
                        rusqlite::Error::SqliteFailure(err, _)
                            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                        {
                            StorageError::ConstraintViolation(format!(
                                "Puzzle {} is already stored",
                                record.id
                            ))
                        }
                        other => StorageError::Sqlite(other),
                    })?;
                }
            }
            tx.commit()?;

            saved += batch.len();
            tracing::info!("Saved {} puzzles from index", batch.len());
        }

        Ok(saved)
    }

    fn fetch_unenriched(&self) -> StorageResult<Vec<(RecordHandle, CandidateRecord)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM puzzles WHERE has_img = 0 ORDER BY puzzle_id DESC",
            PUZZLE_COLUMNS
        ))?;

        let rows = stmt
            .query_map([], PuzzleRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|row| row.into_stored().map(|stored| (stored.handle, stored.record)))
            .collect()
    }

    fn update(&mut self, handle: RecordHandle, image: &ImageFields) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE puzzles SET has_img = 1, img_url = ?1, img_blob = ?2, img_width = ?3,
             img_height = ?4, img_format = ?5, enriched_at = ?6 WHERE handle = ?7",
            params![
                image.image_url,
                image.image_bytes,
                image.width,
                image.height,
                image.format,
                now,
                handle.0
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::PuzzleNotFound(handle.0));
        }

        Ok(())
    }

    fn get_puzzle(&self, handle: RecordHandle) -> StorageResult<StoredPuzzle> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM puzzles WHERE handle = ?1", PUZZLE_COLUMNS),
                params![handle.0],
                PuzzleRow::from_row,
            )
            .optional()?
            .ok_or(StorageError::PuzzleNotFound(handle.0))?;

        row.into_stored()
    }

    // ===== Run Management =====

    fn create_run(&mut self, kind: RunKind, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (kind, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                kind.to_db_string(),
                now,
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        processed: u64,
        failed: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, processed = ?3, failed = ?4 WHERE id = ?5",
            params![
                status.to_db_string(),
                now,
                processed as i64,
                failed as i64,
                run_id
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }

        Ok(())
    }

    fn get_latest_run(&self, kind: RunKind) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM runs WHERE kind = ?1 ORDER BY id DESC LIMIT 1",
                    RUN_COLUMNS
                ),
                params![kind.to_db_string()],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    // ===== Statistics =====

    fn count_puzzles(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM puzzles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_enriched(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM puzzles WHERE has_img = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_by_difficulty(&self) -> StorageResult<HashMap<Difficulty, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT difficulty, COUNT(*) FROM puzzles GROUP BY difficulty")?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut counts = HashMap::new();
        for (difficulty, count) in rows {
            counts.insert(parse_difficulty(&difficulty)?, count);
        }

        Ok(counts)
    }
}
