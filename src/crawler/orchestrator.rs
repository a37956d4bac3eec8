//! Page orchestrator - drives the crawl of one listing page
//!
//! A run moves through: listing fetched → for each product (detail fetched
//! → review extracted → record persisted) → done. Every product is handled
//! inside its own error boundary, so a failing product is logged and the
//! rest of the page still gets processed.

use crate::catalog::{Product, ProductDetail, ProductId};
use crate::config::CrawlerConfig;
use crate::crawler::client::{ApiClient, FetchFailure, FetchOutcome};
use crate::review::extract_review;
use crate::sink::{ReviewRecord, SharedSink};
use crate::SinkError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Instrument, Span};

/// Page used when none is given
pub const DEFAULT_PAGE: u32 = 1;

/// How the listing request of a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    /// Listing returned products
    Fetched,
    /// Listing answered with no products
    Empty,
    /// Listing request failed; no products were processed
    Failed,
    /// The page task died before reporting
    Aborted,
}

/// Outcome counters of one page run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub page: u32,
    pub listing: ListingStatus,
    /// Products returned by the listing
    pub listed: usize,
    /// Products whose review reached the sink
    pub persisted: usize,
    /// Products skipped for lack of an identifier
    pub skipped: usize,
    /// Products whose detail fetch or persistence failed
    pub failed: usize,
}

impl PageReport {
    fn new(page: u32, listing: ListingStatus) -> Self {
        Self {
            page,
            listing,
            listed: 0,
            persisted: 0,
            skipped: 0,
            failed: 0,
        }
    }

    /// Report for a page whose task panicked or was cancelled
    pub(crate) fn aborted(page: u32) -> Self {
        Self::new(page, ListingStatus::Aborted)
    }

    /// True when the listing was answered and no product failed
    pub fn is_clean(&self) -> bool {
        matches!(self.listing, ListingStatus::Fetched | ListingStatus::Empty) && self.failed == 0
    }
}

/// Failure inside a single product's processing
#[derive(Debug, Error)]
enum ProductError {
    #[error("detail fetch for product {product_id} failed: {source}")]
    Detail {
        product_id: ProductId,
        source: FetchFailure,
    },

    #[error("failed to persist review of product {product_id}: {source}")]
    Persist {
        product_id: ProductId,
        source: SinkError,
    },
}

enum ProductOutcome {
    Persisted,
    Skipped,
}

/// Crawls exactly one listing page
///
/// Orchestrators share nothing but the sink, so several of them with
/// different page numbers can run side by side.
pub struct Orchestrator {
    config: Arc<CrawlerConfig>,
    client: ApiClient,
    sink: SharedSink,
    page: u32,
    span: Span,
}

impl Orchestrator {
    /// Creates an orchestrator for the first page
    ///
    /// # Arguments
    ///
    /// * `config` - Category, brand and endpoint settings
    /// * `client` - The catalog API client
    /// * `sink` - Destination for extracted reviews
    pub fn new(config: Arc<CrawlerConfig>, client: ApiClient, sink: SharedSink) -> Self {
        let span = page_span(&config, DEFAULT_PAGE);
        Self {
            config,
            client,
            sink,
            page: DEFAULT_PAGE,
            span,
        }
    }

    /// Targets another listing page
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self.span = page_span(&self.config, page);
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Runs the page to completion
    ///
    /// Never fails: listing, detail and sink errors are logged and counted
    /// in the returned report.
    pub async fn run(&self) -> PageReport {
        self.run_page().instrument(self.span.clone()).await
    }

    async fn run_page(&self) -> PageReport {
        tracing::info!("Review crawler has started - page {}", self.page);

        let (listing, products) = match self
            .client
            .fetch_product_page(&self.config.category, &self.config.brand, self.page)
            .await
        {
            FetchOutcome::Data(products) => (ListingStatus::Fetched, products),
            FetchOutcome::Empty => (ListingStatus::Empty, Vec::new()),
            FetchOutcome::Failed(failure) => {
                tracing::error!("Listing fetch failed at page {}: {}", self.page, failure);
                (ListingStatus::Failed, Vec::new())
            }
        };

        let mut report = PageReport::new(self.page, listing);
        report.listed = products.len();
        tracing::info!("{} products listed on page {}", products.len(), self.page);

        for product in &products {
            match self.process_product(product).await {
                Ok(ProductOutcome::Persisted) => report.persisted += 1,
                Ok(ProductOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!("Error during crawler run at page {}: {}", self.page, e);
                }
            }
        }

        tracing::info!(
            persisted = report.persisted,
            skipped = report.skipped,
            failed = report.failed,
            "Crawling of page {} completed",
            self.page
        );

        report
    }

    /// Fetches, extracts and persists a single product
    async fn process_product(&self, product: &Product) -> Result<ProductOutcome, ProductError> {
        let Some(product_id) = product.id() else {
            tracing::debug!("Skipping product without identifier");
            return Ok(ProductOutcome::Skipped);
        };

        let detail = match self.client.fetch_product_detail(&product_id).await {
            FetchOutcome::Data(detail) => detail,
            FetchOutcome::Empty => ProductDetail::empty(),
            FetchOutcome::Failed(source) => {
                return Err(ProductError::Detail { product_id, source });
            }
        };

        let review = extract_review(&detail);
        if review.is_empty() {
            tracing::debug!("No review text for product {}", product_id);
        }
        let record = ReviewRecord::new(
            &product_id,
            self.page,
            &self.config.category,
            &self.config.brand,
            review,
        );

        if let Err(source) = self.persist(&record) {
            return Err(ProductError::Persist { product_id, source });
        }

        tracing::debug!("Stored review for product {}", product_id);
        Ok(ProductOutcome::Persisted)
    }

    fn persist(&self, record: &ReviewRecord) -> Result<(), SinkError> {
        let mut sink = self.sink.lock().map_err(|_| SinkError::Poisoned)?;
        sink.persist(record)
    }
}

fn page_span(config: &CrawlerConfig, page: u32) -> Span {
    tracing::info_span!(
        "crawl",
        page,
        category = %config.category,
        brand = %config.brand
    )
}
