//! SQLite sink implementation
//!
//! Reviews are grouped under crawl runs. A run must be started before the
//! first record is persisted.

use crate::review::ExtractedReview;
use crate::sink::schema::initialize_schema;
use crate::sink::{ReviewRecord, ReviewSink};
use crate::{SinkError, SinkResult};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of a crawl run
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

/// SQLite review sink
pub struct SqliteSink {
    conn: Connection,
    run_id: Option<i64>,
}

impl SqliteSink {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteSink)` - Successfully opened/created database
    /// * `Err(SinkError)` - Failed to open database
    pub fn new(path: &Path) -> SinkResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn, run_id: None })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn, run_id: None })
    }

    /// Opens a new run; subsequent records are attached to it
    pub fn start_run(&mut self, config_hash: &str) -> SinkResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        let run_id = self.conn.last_insert_rowid();
        self.run_id = Some(run_id);
        Ok(run_id)
    }

    /// Closes the active run with a final status and finish timestamp
    pub fn complete_run(&mut self, status: RunStatus) -> SinkResult<()> {
        let run_id = self.run_id.take().ok_or(SinkError::NoActiveRun)?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        Ok(())
    }

    pub fn active_run(&self) -> Option<i64> {
        self.run_id
    }

    pub fn get_latest_run(&self) -> SinkResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    pub fn count_runs(&self) -> SinkResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn count_reviews(&self) -> SinkResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Counts reviews whose description came out empty
    pub fn count_empty_descriptions(&self) -> SinkResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE description = ''",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Review counts per listing page for one run, ordered by page
    pub fn reviews_by_page(&self, run_id: i64) -> SinkResult<Vec<(u32, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT page, COUNT(*) FROM reviews WHERE run_id = ?1 GROUP BY page ORDER BY page",
        )?;

        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)? as u64))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    /// Loads the records of one run in insertion order
    pub fn load_reviews(&self, run_id: i64) -> SinkResult<Vec<ReviewRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT product_id, page, category, brand, description, attributes, crawled_at
             FROM reviews WHERE run_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![run_id], |row| {
            let crawled_at: String = row.get(6)?;
            Ok(ReviewRecord {
                product_id: row.get(0)?,
                page: row.get(1)?,
                category: row.get(2)?,
                brand: row.get(3)?,
                review: ExtractedReview {
                    description: row.get(4)?,
                    attributes: row.get(5)?,
                },
                crawled_at: crawled_at.parse().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e))
                })?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

impl ReviewSink for SqliteSink {
    fn persist(&mut self, record: &ReviewRecord) -> SinkResult<()> {
        let run_id = self.run_id.ok_or(SinkError::NoActiveRun)?;
        self.conn.execute(
            "INSERT INTO reviews (run_id, product_id, page, category, brand, description, attributes, crawled_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                run_id,
                record.product_id,
                record.page,
                record.category,
                record.brand,
                record.review.description,
                record.review.attributes,
                record.crawled_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Running),
    })
}
