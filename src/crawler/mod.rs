//! Crawler module for catalog fetching and page orchestration
//!
//! This module contains the core crawling logic, including:
//! - The catalog API client and its explicit fetch outcomes
//! - Randomized client identity for outbound requests
//! - Per-page orchestration with per-product failure isolation

mod client;
mod orchestrator;
mod user_agent;

pub use client::{ApiClient, FetchFailure, FetchOutcome, ACCEPT_JSON};
pub use orchestrator::{ListingStatus, Orchestrator, PageReport, DEFAULT_PAGE};
pub use user_agent::random_user_agent;

use crate::config::CrawlerConfig;
use crate::sink::SharedSink;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Crawls several listing pages, one orchestrator per page
///
/// Pages run one after another in the given order, or as independent
/// tasks when `concurrent` is set. Reports come back ordered by page, one
/// per requested page; a task that dies is reported as
/// [`ListingStatus::Aborted`].
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `client` - The catalog API client, shared by all orchestrators
/// * `sink` - Destination for extracted reviews
/// * `pages` - Listing pages to crawl
/// * `concurrent` - Whether pages may overlap in time
///
/// # Example
///
/// ```no_run
/// use review_crawler::config::load_config;
/// use review_crawler::crawler::crawl_pages;
/// use review_crawler::sink::{share, MemorySink};
/// use review_crawler::ApiClient;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let client = ApiClient::new(&config.crawler)?;
/// let sink = share(MemorySink::new());
/// for report in crawl_pages(Arc::new(config.crawler), client, sink, &[1, 2], false).await {
///     println!("page {}: {} stored", report.page, report.persisted);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn crawl_pages(
    config: Arc<CrawlerConfig>,
    client: ApiClient,
    sink: SharedSink,
    pages: &[u32],
    concurrent: bool,
) -> Vec<PageReport> {
    let orchestrators = pages.iter().map(|&page| {
        Orchestrator::new(config.clone(), client.clone(), sink.clone()).with_page(page)
    });

    let mut reports = Vec::with_capacity(pages.len());

    if concurrent {
        let mut tasks = JoinSet::new();
        for orchestrator in orchestrators {
            tasks.spawn(async move { orchestrator.run().await });
        }

        let mut lost = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => {
                    lost += 1;
                    tracing::error!("Page task aborted: {}", e);
                }
            }
        }

        if lost > 0 {
            let mut missing = pages.to_vec();
            for report in &reports {
                if let Some(i) = missing.iter().position(|&page| page == report.page) {
                    missing.swap_remove(i);
                }
            }
            reports.extend(missing.into_iter().map(PageReport::aborted));
        }
        reports.sort_by_key(|report| report.page);
    } else {
        for orchestrator in orchestrators {
            reports.push(orchestrator.run().await);
        }
    }

    reports
}
