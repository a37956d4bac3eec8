//! Review-Crawler main entry point
//!
//! This is the command-line interface for the Review-Crawler catalog harvester.

use anyhow::Context;
use clap::Parser;
use review_crawler::config::template::fill_listing_template;
use review_crawler::config::{load_config_with_hash, Config, LoggingConfig, SinkKind};
use review_crawler::crawler::{crawl_pages, PageReport, DEFAULT_PAGE};
use review_crawler::sink::{
    load_statistics, print_statistics, share, JsonLinesSink, RunStatus, SqliteSink,
};
use review_crawler::{ApiClient, SharedSink};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Review-Crawler: a paginated product-catalog review harvester
///
/// Lists the products of a category and brand one page at a time, fetches
/// every product's detail payload and stores its normalized review text.
#[derive(Parser, Debug)]
#[command(name = "review-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A paginated product-catalog review harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Listing page to crawl; repeat for several pages
    #[arg(short, long = "page", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pages: Vec<u32>,

    /// Crawl the given pages as concurrent, independent tasks
    #[arg(long)]
    concurrent: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show which listing URLs would be fetched
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the review database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    // Setup logging based on verbosity and the configured log directory
    setup_logging(cli.verbose, cli.quiet, &config.logging)?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let pages = if cli.pages.is_empty() {
        vec![DEFAULT_PAGE]
    } else {
        cli.pages.clone()
    };

    if cli.dry_run {
        handle_dry_run(&config, &pages);
        Ok(())
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config, &config_hash, &pages, cli.concurrent).await
    }
}

/// Sets up the logging/tracing subscriber
///
/// Events go to stderr; when a log directory is configured they are also
/// appended to a daily `log_YYYY-MM-DD.log` file there.
fn setup_logging(verbose: u8, quiet: bool, logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("review_crawler=info,warn"),
            1 => EnvFilter::new("review_crawler=debug,info"),
            2 => EnvFilter::new("review_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match &logging.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)
                .with_context(|| format!("Failed to create log directory {}", directory))?;
            let path = Path::new(directory).join(format!(
                "log_{}.log",
                chrono::Local::now().format("%Y-%m-%d")
            ));
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            builder
                .with_ansi(false)
                .with_writer(std::io::stderr.and(Mutex::new(file)))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, pages: &[u32]) {
    println!("=== Review-Crawler Dry Run ===\n");

    println!("Catalog:");
    println!("  Category: {}", config.crawler.category);
    println!("  Brand: {}", config.crawler.brand);
    println!("  Detail endpoint: {}", config.crawler.url_get_product_detail);
    println!(
        "  Timeouts: {}s total, {}s connect",
        config.crawler.request_timeout_secs, config.crawler.connect_timeout_secs
    );

    println!("\nOutput:");
    println!("  Sink: {:?}", config.output.sink);
    println!("  Path: {}", config.output.path);

    println!("\nListing URLs ({}):", pages.len());
    for &page in pages {
        println!(
            "  - {}",
            fill_listing_template(
                &config.crawler.url_get_products,
                &config.crawler.category,
                &config.crawler.brand,
                page
            )
        );
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    if config.output.sink != SinkKind::Sqlite {
        anyhow::bail!("--stats needs the sqlite sink, configured sink is {:?}", config.output.sink);
    }

    println!("Database: {}\n", config.output.path);

    let sink = SqliteSink::new(Path::new(&config.output.path))?;
    let stats = load_statistics(&sink)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: &str,
    pages: &[u32],
    concurrent: bool,
) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling category '{}' brand '{}', pages {:?}",
        config.crawler.category,
        config.crawler.brand,
        pages
    );

    let client = ApiClient::new(&config.crawler).context("Failed to build HTTP client")?;
    let crawler_config = Arc::new(config.crawler);
    let output_path = Path::new(&config.output.path);

    let reports = match config.output.sink {
        SinkKind::Sqlite => {
            let (sqlite, run_id) = start_sqlite_run(output_path, config_hash)
                .with_context(|| format!("Failed to open database {}", output_path.display()))?;
            tracing::info!("Started run {}", run_id);

            let sqlite = share(sqlite);
            let sink: SharedSink = sqlite.clone();
            let reports = crawl_pages(crawler_config, client, sink, pages, concurrent).await;

            let status = if reports.iter().all(PageReport::is_clean) {
                RunStatus::Completed
            } else {
                RunStatus::Failed
            };
            sqlite
                .lock()
                .map_err(|_| anyhow::anyhow!("Database handle poisoned"))?
                .complete_run(status)?;
            reports
        }
        SinkKind::Jsonl => {
            let jsonl = JsonLinesSink::new(output_path)
                .with_context(|| format!("Failed to open {}", output_path.display()))?;
            let sink: SharedSink = share(jsonl);
            crawl_pages(crawler_config, client, sink, pages, concurrent).await
        }
    };

    print_reports(&reports);
    Ok(())
}

/// Opens the review database and starts a run in it
fn start_sqlite_run(path: &Path, config_hash: &str) -> review_crawler::Result<(SqliteSink, i64)> {
    let mut sqlite = SqliteSink::new(path)?;
    let run_id = sqlite.start_run(config_hash)?;
    Ok((sqlite, run_id))
}

fn print_reports(reports: &[PageReport]) {
    println!("=== Crawl Summary ===\n");
    for report in reports {
        println!(
            "  page {}: listing {:?}, {} listed, {} stored, {} skipped, {} failed",
            report.page,
            report.listing,
            report.listed,
            report.persisted,
            report.skipped,
            report.failed
        );
    }

    let persisted: usize = reports.iter().map(|r| r.persisted).sum();
    println!("\n✓ {} reviews stored", persisted);
}
