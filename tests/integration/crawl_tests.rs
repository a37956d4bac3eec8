//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock catalog APIs and test the full
//! listing → detail → extract → persist cycle end-to-end.

use review_crawler::catalog::ProductId;
use review_crawler::config::CrawlerConfig;
use review_crawler::crawler::{crawl_pages, ListingStatus, Orchestrator, ACCEPT_JSON};
use review_crawler::sink::{share, MemorySink, ReviewRecord, ReviewSink, RunStatus, SqliteSink};
use review_crawler::{ApiClient, FetchFailure, FetchOutcome, SharedSink, SinkError, SinkResult};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const LISTING_PATH: &str = "/v1/categories/mobile-phone/brands/samsung/search/";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str) -> CrawlerConfig {
    CrawlerConfig {
        url_get_products: format!(
            "{}/v1/categories/{{category}}/brands/{{brand}}/search/?page={{page}}",
            base_url
        ),
        url_get_product_detail: format!("{}/v2/product/{{productid}}/", base_url),
        category: "mobile-phone".to_string(),
        brand: "samsung".to_string(),
        request_timeout_secs: 5,
        connect_timeout_secs: 5,
    }
}

fn review_body(description: &str, color: &str) -> Value {
    json!({
        "status": 200,
        "data": {"product": {"id": 1, "review": {
            "description": description,
            "attributes": [{"title": "Color", "values": [color]}]
        }}}
    })
}

async fn mount_listing(server: &MockServer, page: u32, products: Value) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("page", page.to_string()))
        .and(header_exists("accept"))
        .and(header_exists("user-agent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"products": products}})),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/product/{}/", id)))
        .and(header_exists("user-agent"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn orchestrator(config: CrawlerConfig, sink: SharedSink) -> Orchestrator {
    let client = ApiClient::new(&config).expect("Failed to build client");
    Orchestrator::new(Arc::new(config), client, sink)
}

fn product_ids(sink: &Mutex<MemorySink>) -> Vec<String> {
    sink.lock()
        .unwrap()
        .records()
        .iter()
        .map(|r| r.product_id.clone())
        .collect()
}

#[tokio::test]
async fn test_product_without_id_is_skipped() {
    let mock_server = MockServer::start().await;

    mount_listing(
        &mock_server,
        1,
        json!([{"id": 11, "title": "A"}, {"title": "no id"}, {"id": "33"}]),
    )
    .await;
    mount_detail(
        &mock_server,
        "11",
        ResponseTemplate::new(200).set_body_json(review_body("  first\u{200c} phone ", "Red")),
    )
    .await;
    mount_detail(
        &mock_server,
        "33",
        ResponseTemplate::new(200).set_body_json(review_body("third", "Blue")),
    )
    .await;

    let memory = share(MemorySink::new());
    let report = orchestrator(create_test_config(&mock_server.uri()), memory.clone())
        .run()
        .await;

    assert_eq!(report.page, 1);
    assert_eq!(report.listing, ListingStatus::Fetched);
    assert_eq!(report.listed, 3);
    assert_eq!(report.persisted, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);

    assert_eq!(product_ids(&memory), vec!["11", "33"]);

    let sink = memory.lock().unwrap();
    let first = &sink.records()[0];
    assert_eq!(first.review.description, "first phone");
    assert_eq!(first.review.attributes, "Color: Red");
    assert_eq!(first.category, "mobile-phone");
    assert_eq!(first.brand, "samsung");
    drop(sink);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_failed_detail_does_not_stop_the_page() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, json!([{"id": 1}, {"id": 2}, {"id": 3}])).await;
    mount_detail(
        &mock_server,
        "1",
        ResponseTemplate::new(200).set_body_json(review_body("one", "Red")),
    )
    .await;
    mount_detail(&mock_server, "2", ResponseTemplate::new(500)).await;
    mount_detail(
        &mock_server,
        "3",
        ResponseTemplate::new(200).set_body_json(review_body("three", "Blue")),
    )
    .await;

    let memory = share(MemorySink::new());
    let report = orchestrator(create_test_config(&mock_server.uri()), memory.clone())
        .run()
        .await;

    assert_eq!(report.persisted, 2);
    assert_eq!(report.failed, 1);
    assert!(!report.is_clean());
    assert_eq!(product_ids(&memory), vec!["1", "3"]);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_failure_is_logged_with_page_number() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 2, json!([{"id": 21}, {"id": 22}])).await;
    mount_detail(
        &mock_server,
        "21",
        ResponseTemplate::new(200).set_body_json(review_body("ok", "Red")),
    )
    .await;
    mount_detail(
        &mock_server,
        "22",
        ResponseTemplate::new(200).set_body_string("<html>not json</html>"),
    )
    .await;

    let captured = Arc::new(Mutex::new(Vec::<u8>::new()));
    let writer = {
        let captured = captured.clone();
        move || CapturedWriter(captured.clone())
    };
    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let memory = share(MemorySink::new());
    let report = orchestrator(create_test_config(&mock_server.uri()), memory.clone())
        .with_page(2)
        .run()
        .await;

    assert_eq!(report.persisted, 1);
    assert_eq!(report.failed, 1);

    let logs = String::from_utf8(captured.lock().unwrap().clone()).unwrap();
    assert!(logs.contains("Error during crawler run at page 2"), "{}", logs);
    assert!(logs.contains("product 22"), "{}", logs);
    assert!(logs.contains("page=2"), "{}", logs);

    // One error line per failed product
    let error_lines = logs.lines().filter(|line| line.contains("ERROR")).count();
    assert_eq!(error_lines, 1, "{}", logs);
}

#[derive(Clone)]
struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_empty_detail_persists_empty_review() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, json!([{"id": 5}])).await;
    mount_detail(&mock_server, "5", ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let memory = share(MemorySink::new());
    let report = orchestrator(create_test_config(&mock_server.uri()), memory.clone())
        .run()
        .await;

    assert_eq!(report.persisted, 1);
    let sink = memory.lock().unwrap();
    assert_eq!(sink.records()[0].review.description, "");
    assert_eq!(sink.records()[0].review.attributes, "");
}

#[tokio::test]
async fn test_empty_listing() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, 1, json!([])).await;

    let memory = share(MemorySink::new());
    let report = orchestrator(create_test_config(&mock_server.uri()), memory.clone())
        .run()
        .await;

    assert_eq!(report.listing, ListingStatus::Empty);
    assert_eq!(report.listed, 0);
    assert!(report.is_clean());
    assert!(memory.lock().unwrap().records().is_empty());
}

#[tokio::test]
async fn test_listing_failures_return_empty_products() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&create_test_config(&mock_server.uri())).unwrap();

    let outcome = client.fetch_product_page("mobile-phone", "samsung", 1).await;
    assert!(matches!(
        outcome.failure(),
        Some(FetchFailure::Status { status: 503, .. })
    ));
    assert!(outcome.into_data_or_default().is_empty());

    let outcome = client.fetch_product_page("mobile-phone", "samsung", 2).await;
    assert!(matches!(outcome.failure(), Some(FetchFailure::Malformed { .. })));
    assert!(outcome.into_data_or_default().is_empty());

    let outcome = client.fetch_product_page("mobile-phone", "samsung", 3).await;
    assert!(matches!(outcome.failure(), Some(FetchFailure::Malformed { .. })));
}

#[tokio::test]
async fn test_detail_outcomes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/product/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(review_body("x", "Red")))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/product/2/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 200})))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/product/3/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&create_test_config(&mock_server.uri())).unwrap();

    assert!(client.fetch_product_detail(&ProductId::new("1")).await.is_data());
    assert!(client.fetch_product_detail(&ProductId::new("2")).await.is_empty());

    let outcome = client.fetch_product_detail(&ProductId::new("3")).await;
    assert!(outcome.is_failed());
    assert!(outcome.into_data_or_default().payload().as_object().unwrap().is_empty());
}

/// Header values as sent, rejoined after the mock server split them on commas
fn header_value(request: &Request, name: &str) -> String {
    request
        .headers
        .iter()
        .filter(|(key, _)| key.as_str().eq_ignore_ascii_case(name))
        .flat_map(|(_, values)| values.iter().map(|value| value.as_str().to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[tokio::test]
async fn test_request_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/product/7/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(review_body("x", "Red")))
        .expect(5)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&create_test_config(&mock_server.uri())).unwrap();
    for _ in 0..5 {
        assert!(client.fetch_product_detail(&ProductId::new("7")).await.is_data());
    }

    let requests = mock_server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert_eq!(requests.len(), 5);

    for request in &requests {
        assert_eq!(header_value(request, "accept"), "application/json, text/plain, */*");
        assert_eq!(header_value(request, "accept"), ACCEPT_JSON);
        assert!(header_value(request, "user-agent").starts_with("Mozilla/5.0 ("));
    }

    // Every request draws a fresh user agent
    let agents: HashSet<String> = requests
        .iter()
        .map(|request| header_value(request, "user-agent"))
        .collect();
    assert!(agents.len() > 1, "{:?}", agents);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_failure() {
    // Nothing listens on the discard port
    let config = create_test_config("http://127.0.0.1:9");
    let client = ApiClient::new(&config).unwrap();

    let outcome = client.fetch_product_page("mobile-phone", "samsung", 1).await;
    assert!(matches!(
        outcome,
        FetchOutcome::Failed(FetchFailure::Transport { .. })
    ));
}

/// Sink that rejects one product id
struct RejectingSink {
    reject: String,
    accepted: Vec<String>,
}

impl ReviewSink for RejectingSink {
    fn persist(&mut self, record: &ReviewRecord) -> SinkResult<()> {
        if record.product_id == self.reject {
            return Err(SinkError::Io(io::Error::new(io::ErrorKind::Other, "disk full")));
        }
        self.accepted.push(record.product_id.clone());
        Ok(())
    }
}

#[tokio::test]
async fn test_sink_failure_is_isolated() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, json!([{"id": 1}, {"id": 2}, {"id": 3}])).await;
    for id in ["1", "2", "3"] {
        mount_detail(
            &mock_server,
            id,
            ResponseTemplate::new(200).set_body_json(review_body("d", "Red")),
        )
        .await;
    }

    let rejecting = share(RejectingSink {
        reject: "2".to_string(),
        accepted: Vec::new(),
    });
    let report = orchestrator(create_test_config(&mock_server.uri()), rejecting.clone())
        .run()
        .await;

    assert_eq!(report.persisted, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(rejecting.lock().unwrap().accepted, vec!["1", "3"]);
}

/// Sink that crashes the task persisting into it
struct PanickingSink;

impl ReviewSink for PanickingSink {
    fn persist(&mut self, record: &ReviewRecord) -> SinkResult<()> {
        panic!("sink crashed on product {}", record.product_id);
    }
}

#[tokio::test]
async fn test_crashed_page_task_is_reported() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, json!([{"id": 1}])).await;
    mount_listing(&mock_server, 2, json!([])).await;
    mount_detail(
        &mock_server,
        "1",
        ResponseTemplate::new(200).set_body_json(review_body("d", "Red")),
    )
    .await;

    let config = create_test_config(&mock_server.uri());
    let client = ApiClient::new(&config).unwrap();
    let reports = crawl_pages(Arc::new(config), client, share(PanickingSink), &[1, 2], true).await;

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].page, 1);
    assert_eq!(reports[0].listing, ListingStatus::Aborted);
    assert!(!reports[0].is_clean());

    assert_eq!(reports[1].page, 2);
    assert_eq!(reports[1].listing, ListingStatus::Empty);
    assert!(reports[1].is_clean());
}

#[tokio::test]
async fn test_two_pages_run_independently() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, json!([{"id": 101}, {"id": 102}])).await;
    mount_listing(&mock_server, 2, json!([{"id": 201}])).await;
    for id in ["101", "102", "201"] {
        mount_detail(
            &mock_server,
            id,
            ResponseTemplate::new(200).set_body_json(review_body(id, "Red")),
        )
        .await;
    }

    let config = create_test_config(&mock_server.uri());
    let memory = share(MemorySink::new());

    let first = orchestrator(config.clone(), memory.clone()).with_page(1).run().await;
    let second = orchestrator(config, memory.clone()).with_page(2).run().await;

    assert_eq!((first.page, first.persisted), (1, 2));
    assert_eq!((second.page, second.persisted), (2, 1));

    let sink = memory.lock().unwrap();
    let pages: Vec<(String, u32)> = sink
        .records()
        .iter()
        .map(|r| (r.product_id.clone(), r.page))
        .collect();
    assert_eq!(
        pages,
        vec![
            ("101".to_string(), 1),
            ("102".to_string(), 1),
            ("201".to_string(), 2)
        ]
    );
    assert_eq!(sink.records()[2].review.description, "201");
    drop(sink);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_concurrent_pages_into_sqlite() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, json!([{"id": 1}, {"id": 2}])).await;
    mount_listing(&mock_server, 2, json!([{"id": 3}, {"title": "no id"}])).await;
    for id in ["1", "2", "3"] {
        mount_detail(
            &mock_server,
            id,
            ResponseTemplate::new(200).set_body_json(review_body("desc", "Red")),
        )
        .await;
    }

    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("reviews.db");

    let mut sqlite = SqliteSink::new(&db_path).expect("Failed to open DB");
    let run_id = sqlite.start_run("test-hash").unwrap();
    let sqlite = share(sqlite);

    let config = create_test_config(&mock_server.uri());
    let client = ApiClient::new(&config).unwrap();
    let reports = crawl_pages(Arc::new(config), client, sqlite.clone(), &[2, 1], true).await;

    assert_eq!(reports.iter().map(|r| r.page).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(reports[0].persisted, 2);
    assert_eq!(reports[1].persisted, 1);
    assert_eq!(reports[1].skipped, 1);

    let mut sqlite = sqlite.lock().unwrap();
    sqlite.complete_run(RunStatus::Completed).unwrap();
    assert_eq!(sqlite.count_reviews().unwrap(), 3);
    assert_eq!(sqlite.reviews_by_page(run_id).unwrap(), vec![(1, 2), (2, 1)]);

    let page_one: Vec<String> = sqlite
        .load_reviews(run_id)
        .unwrap()
        .into_iter()
        .filter(|r| r.page == 1)
        .map(|r| r.product_id)
        .collect();
    assert_eq!(page_one, vec!["1", "2"]);
    drop(sqlite);

    mock_server.verify().await;
}
