//! Configuration module for Review-Crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use review_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawling brand: {}", config.crawler.brand);
//! ```

mod parser;
pub mod template;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, LoggingConfig, OutputConfig, SinkKind};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
