//! Statistics generation from the review database
//!
//! This module provides functionality for extracting and displaying
//! review statistics from the SQLite sink.

use crate::sink::{RunRecord, SqliteSink};
use crate::SinkResult;

/// Review database statistics summary
#[derive(Debug, Clone)]
pub struct ReviewStatistics {
    /// Number of crawl runs recorded
    pub total_runs: u64,

    /// Number of reviews across all runs
    pub total_reviews: u64,

    /// Reviews stored without a description
    pub empty_descriptions: u64,

    /// The most recent run, if any
    pub latest_run: Option<RunRecord>,

    /// Review counts per page for the most recent run
    pub latest_by_page: Vec<(u32, u64)>,
}

/// Loads statistics from the sink
///
/// # Arguments
///
/// * `sink` - The SQLite sink to query
///
/// # Returns
///
/// * `Ok(ReviewStatistics)` - Successfully loaded statistics
/// * `Err(SinkError)` - Failed to query statistics
pub fn load_statistics(sink: &SqliteSink) -> SinkResult<ReviewStatistics> {
    let latest_run = sink.get_latest_run()?;
    let latest_by_page = match &latest_run {
        Some(run) => sink.reviews_by_page(run.id)?,
        None => Vec::new(),
    };

    Ok(ReviewStatistics {
        total_runs: sink.count_runs()?,
        total_reviews: sink.count_reviews()?,
        empty_descriptions: sink.count_empty_descriptions()?,
        latest_run,
        latest_by_page,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &ReviewStatistics) {
    println!("=== Review Statistics ===\n");

    println!("Overview:");
    println!("  Runs recorded: {}", stats.total_runs);
    println!("  Reviews stored: {}", stats.total_reviews);
    println!(
        "  Without description: {} ({:.1}%)",
        stats.empty_descriptions,
        percentage(stats.empty_descriptions, stats.total_reviews)
    );
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run (#{}):", run.id);
            println!("  Started: {}", run.started_at);
            println!(
                "  Finished: {}",
                run.finished_at.as_deref().unwrap_or("(not finished)")
            );
            println!("  Status: {}", run.status.to_db_string());
            println!("  Config hash: {}", run.config_hash);

            if !stats.latest_by_page.is_empty() {
                println!("  Reviews by page:");
                for (page, count) in &stats.latest_by_page {
                    println!("    page {}: {}", page, count);
                }
            }
        }
        None => println!("No runs recorded yet."),
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
