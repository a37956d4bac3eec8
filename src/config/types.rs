use serde::Deserialize;

/// Main configuration structure for Review-Crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Endpoint templates and catalog filter for a crawl
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Listing URL template with `{category}`, `{brand}` and `{page}` placeholders
    pub url_get_products: String,

    /// Detail URL template with a `{productid}` placeholder
    pub url_get_product_detail: String,

    /// Catalog category to list
    pub category: String,

    /// Brand filter within the category
    pub brand: String,

    /// Total timeout for a single request (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connect timeout for a single request (seconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Which sink adapter receives extracted reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Sqlite,
    Jsonl,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_sink")]
    pub sink: SinkKind,

    /// Path to the SQLite database or JSON-lines file
    #[serde(default = "default_output_path")]
    pub path: String,
}

fn default_sink() -> SinkKind {
    SinkKind::Sqlite
}

fn default_output_path() -> String {
    "./reviews.db".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sink: default_sink(),
            path: default_output_path(),
        }
    }
}

/// Log file configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Directory for daily log files; stderr only when unset
    pub directory: Option<String>,
}
