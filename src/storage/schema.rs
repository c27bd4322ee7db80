//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Kakurizer database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track scan and enrichment runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    processed INTEGER NOT NULL DEFAULT 0,
    failed INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_runs_kind ON runs(kind);

-- One row per puzzle; handle is the surrogate key
CREATE TABLE IF NOT EXISTS puzzles (
    handle INTEGER PRIMARY KEY AUTOINCREMENT,
    puzzle_id INTEGER NOT NULL UNIQUE,
    timestamp_millis INTEGER NOT NULL,
    difficulty TEXT NOT NULL,
    page_url TEXT NOT NULL,
    discovered_at TEXT NOT NULL,
    has_img INTEGER NOT NULL DEFAULT 0,
    img_url TEXT,
    img_width INTEGER,
    img_height INTEGER,
    img_format TEXT,
    -- img_blob is never indexed
    img_blob BLOB,
    enriched_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_puzzles_has_img ON puzzles(has_img);
CREATE INDEX IF NOT EXISTS idx_puzzles_difficulty ON puzzles(difficulty);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
