//! Sinks for extracted reviews
//!
//! A sink receives one [`ReviewRecord`] per product that reached extraction.
//! The contract is append-only: records arrive in listing order, are never
//! updated, and are not deduplicated across runs.
//!
//! Adapters:
//! - [`SqliteSink`] - runs and reviews tables in a SQLite database
//! - [`JsonLinesSink`] - one JSON object per line in an append-only file
//! - [`MemorySink`] - keeps records in memory

mod jsonl;
mod schema;
mod sqlite;
pub mod stats;

pub use jsonl::JsonLinesSink;
pub use sqlite::{RunRecord, RunStatus, SqliteSink};
pub use stats::{load_statistics, print_statistics, ReviewStatistics};

use crate::catalog::ProductId;
use crate::review::ExtractedReview;
use crate::SinkResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// A review ready for persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub product_id: String,
    pub page: u32,
    pub category: String,
    pub brand: String,
    #[serde(flatten)]
    pub review: ExtractedReview,
    pub crawled_at: DateTime<Utc>,
}

impl ReviewRecord {
    /// Creates a record stamped with the current time
    pub fn new(
        product_id: &ProductId,
        page: u32,
        category: &str,
        brand: &str,
        review: ExtractedReview,
    ) -> Self {
        Self {
            product_id: product_id.to_string(),
            page,
            category: category.to_string(),
            brand: brand.to_string(),
            review,
            crawled_at: Utc::now(),
        }
    }
}

/// Write-only destination for extracted reviews
pub trait ReviewSink: Send {
    /// Stores one record
    fn persist(&mut self, record: &ReviewRecord) -> SinkResult<()>;
}

impl<S: ReviewSink + ?Sized> ReviewSink for Box<S> {
    fn persist(&mut self, record: &ReviewRecord) -> SinkResult<()> {
        (**self).persist(record)
    }
}

/// A sink shared between orchestrators
///
/// Locked only for the duration of a single `persist` call.
pub type SharedSink = Arc<Mutex<dyn ReviewSink>>;

/// Wraps a concrete sink for sharing
pub fn share<S: ReviewSink + 'static>(sink: S) -> Arc<Mutex<S>> {
    Arc::new(Mutex::new(sink))
}

/// Keeps every record in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<ReviewRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }
}

impl ReviewSink for MemorySink {
    fn persist(&mut self, record: &ReviewRecord) -> SinkResult<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
