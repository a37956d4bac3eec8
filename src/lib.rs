//! Review-Crawler: a paginated product-catalog review harvester
//!
//! This crate walks one listing page of a product catalog API at a time,
//! fetches the detail payload of every listed product, extracts and
//! normalizes its review text, and hands the result to a pluggable sink.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod review;
pub mod sink;

use thiserror::Error;

/// Errors raised while setting up a crawl
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised by review sinks
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Sink lock poisoned")]
    Poisoned,

    #[error("No active run; call start_run first")]
    NoActiveRun,
}

/// Result type alias for crawl setup
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for sink operations
pub type SinkResult<T> = std::result::Result<T, SinkError>;

// Re-export commonly used types
pub use catalog::{Product, ProductDetail, ProductId};
pub use config::Config;
pub use crawler::{ApiClient, FetchFailure, FetchOutcome, Orchestrator, PageReport};
pub use review::{extract_review, normalize, ExtractedReview, ReviewAttribute};
pub use sink::{ReviewRecord, ReviewSink, SharedSink};
