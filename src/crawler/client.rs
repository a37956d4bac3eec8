//! Catalog API client
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with bounded timeouts
//! - Filling the listing and detail URL templates
//! - Sending JSON requests with a fresh random user agent each time
//! - Classifying failures into an explicit fetch outcome

use crate::catalog::{Product, ProductDetail, ProductId};
use crate::config::template::{fill_detail_template, fill_listing_template};
use crate::config::CrawlerConfig;
use crate::crawler::user_agent::random_user_agent;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// `accept` header sent with every catalog request
pub const ACCEPT_JSON: &str = "application/json, text/plain, */*";

/// Result of a catalog fetch
///
/// Separates "the endpoint answered but had nothing" from "the call
/// failed", so callers can decide whether to retry, skip or abort.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// The endpoint answered with content
    Data(T),

    /// The endpoint answered successfully but had nothing to return
    Empty,

    /// Transport error, non-2xx status or unusable body
    Failed(FetchFailure),
}

impl<T> FetchOutcome<T> {
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the payload, if any
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the failure, if any
    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl<T: Default> FetchOutcome<T> {
    /// Collapses the outcome into a plain value: an empty listing or an
    /// empty detail mapping for both `Empty` and `Failed`
    pub fn into_data_or_default(self) -> T {
        match self {
            Self::Data(data) => data,
            Self::Empty | Self::Failed(_) => T::default(),
        }
    }
}

/// Why a catalog fetch failed
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

impl FetchFailure {
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::Malformed { url, .. } => {
                url
            }
        }
    }
}

/// HTTP client for the listing and detail endpoints
///
/// Holds no session state: cookies are never stored and every request
/// gets its own user agent. Cheap to clone; clones share a connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    listing_template: String,
    detail_template: String,
}

impl ApiClient {
    /// Builds a client for the configured endpoints
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration (templates and timeouts)
    ///
    /// # Returns
    ///
    /// * `Ok(ApiClient)` - Successfully built client
    /// * `Err(CrawlError::Reqwest)` - Failed to build the underlying HTTP client
    ///
    /// # Example
    ///
    /// ```no_run
    /// use review_crawler::config::load_config;
    /// use review_crawler::ApiClient;
    /// use std::path::Path;
    ///
    /// let config = load_config(Path::new("config.toml")).unwrap();
    /// let client = ApiClient::new(&config.crawler).unwrap();
    /// ```
    pub fn new(config: &CrawlerConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            listing_template: config.url_get_products.clone(),
            detail_template: config.url_get_product_detail.clone(),
        })
    }

    /// Fetches one listing page for a category and brand
    ///
    /// Expects a JSON body with an array at `data.products`. An empty array
    /// is `Empty`; a missing path or non-array value is `Malformed`.
    pub async fn fetch_product_page(
        &self,
        category: &str,
        brand: &str,
        page: u32,
    ) -> FetchOutcome<Vec<Product>> {
        let url = fill_listing_template(&self.listing_template, category, brand, page);

        let outcome = match self.get_json(&url).await {
            Ok(mut body) => match body.pointer_mut("/data/products").map(Value::take) {
                Some(Value::Array(items)) if items.is_empty() => FetchOutcome::Empty,
                Some(Value::Array(items)) => {
                    FetchOutcome::Data(items.into_iter().map(Product::from_value).collect())
                }
                Some(_) => FetchOutcome::Failed(FetchFailure::Malformed {
                    url,
                    reason: "data.products is not an array".to_string(),
                }),
                None => FetchOutcome::Failed(FetchFailure::Malformed {
                    url,
                    reason: "missing data.products".to_string(),
                }),
            },
            Err(failure) => FetchOutcome::Failed(failure),
        };

        if let FetchOutcome::Failed(failure) = &outcome {
            tracing::debug!("Failed to fetch products: {}", failure);
        }

        outcome
    }

    /// Fetches the detail payload of one product
    ///
    /// A body without a `data.product` object (for example `{}`) is `Empty`.
    pub async fn fetch_product_detail(&self, product_id: &ProductId) -> FetchOutcome<ProductDetail> {
        let url = fill_detail_template(&self.detail_template, product_id.as_str());

        match self.get_json(&url).await {
            Ok(body) => {
                let detail = ProductDetail::new(body);
                if detail.has_product() {
                    FetchOutcome::Data(detail)
                } else {
                    tracing::debug!("No product data in detail response for ID {}", product_id);
                    FetchOutcome::Empty
                }
            }
            Err(failure) => {
                tracing::debug!(
                    "Failed to fetch product details for ID {}: {}",
                    product_id,
                    failure
                );
                FetchOutcome::Failed(failure)
            }
        }
    }

    /// Sends a GET request and parses the body as JSON
    async fn get_json(&self, url: &str) -> Result<Value, FetchFailure> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_JSON)
            .header(USER_AGENT, random_user_agent())
            .send()
            .await
            .map_err(|source| FetchFailure::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchFailure::Transport {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|e| FetchFailure::Malformed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
