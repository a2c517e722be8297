//! Dataset workflow against a canned-response stub.

mod common;

use brightdata_sdk::prelude::*;
use common::{fast_poll, Canned, StubServer, TEST_TOKEN};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use std::time::{Duration, Instant};

const TRIGGER: &str = "/datasets/v3/trigger";

fn progress(id: &str) -> String {
    format!("/datasets/v3/progress/{id}")
}

fn snapshot(id: &str) -> String {
    format!("/datasets/v3/snapshot/{id}")
}

fn amazon_request(urls: &[&str]) -> CollectRequest {
    CollectRequest::urls(&catalog::AMAZON_PRODUCTS, urls.iter().copied())
        .poll_interval(Duration::from_millis(10))
        .timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn collect_runs_trigger_poll_fetch() {
    let server = StubServer::start().await;
    server
        .on("POST", TRIGGER, Canned::json(200, json!({"snapshot_id": "s_collect"})))
        .on("GET", &progress("s_collect"), Canned::json(200, json!({"status": "running"})))
        .on("GET", &progress("s_collect"), Canned::json(200, json!({"status": "ready", "records": 1})))
        .on(
            "GET",
            &snapshot("s_collect"),
            Canned::json(200, json!([{"title": "Echo Dot", "asin": "B0CRMZHDG8", "final_price": 49.99}])),
        );

    let result = server
        .client()
        .datasets()
        .collect(amazon_request(&["https://www.amazon.com/dp/B0CRMZHDG8"]))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.status, ResultStatus::Ready);
    assert_eq!(result.method, ScrapeMethod::WebScraper);
    assert_eq!(result.platform.as_deref(), Some("amazon"));
    assert_eq!(result.snapshot_id.as_ref().unwrap().as_str(), "s_collect");
    assert_eq!(result.row_count, Some(1));
    assert_eq!(result.cost, Decimal::from_str("0.001").ok());
    assert_eq!(result.timing.poll_count(), 2);
    assert!(result.timing.trigger_sent_at.is_some());
    assert!(result.timing.data_fetched_at.is_some());

    let products: Vec<AmazonProduct> = result.records().unwrap();
    assert_eq!(products[0].asin.as_deref(), Some("B0CRMZHDG8"));

    let trigger = &server.requests_to(TRIGGER)[0];
    assert_eq!(trigger.method, "POST");
    assert_eq!(trigger.query_param("dataset_id").as_deref(), Some("gd_l7q7dkf244hwxbl93"));
    assert_eq!(trigger.query_param("include_errors").as_deref(), Some("true"));
    assert!(trigger.query_param("type").is_none());
    assert_eq!(trigger.json(), json!([{"url": "https://www.amazon.com/dp/B0CRMZHDG8"}]));
    assert_eq!(
        trigger.headers.get("authorization").map(String::as_str),
        Some(format!("Bearer {TEST_TOKEN}").as_str())
    );
}

#[tokio::test]
async fn collect_url_unwraps_single_record() {
    let server = StubServer::start().await;
    server
        .on("POST", TRIGGER, Canned::json(200, json!({"snapshot_id": "s_single"})))
        .on("GET", &progress("s_single"), Canned::json(200, json!({"status": "ready"})))
        .on(
            "GET",
            &snapshot("s_single"),
            Canned::json(200, json!([{"title": "Rust in Action", "url": "https://www.amazon.com/dp/1617294551"}])),
        );

    let result = server
        .client()
        .datasets()
        .collect_url(&catalog::AMAZON_PRODUCTS, "https://www.amazon.com/dp/1617294551")
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.url.as_deref(), Some("https://www.amazon.com/dp/1617294551"));
    assert_eq!(result.data.as_ref().unwrap()["title"], "Rust in Action");
    let product: AmazonProduct = result.record().unwrap();
    assert_eq!(product.title.as_deref(), Some("Rust in Action"));
}

#[tokio::test]
async fn collect_urls_returns_one_result_per_url() {
    let server = StubServer::start().await;
    server
        .on("POST", TRIGGER, Canned::json(200, json!({"snapshot_id": "s_batch"})))
        .on("GET", &progress("s_batch"), Canned::json(200, json!({"status": "ready"})))
        .on(
            "GET",
            &snapshot("s_batch"),
            Canned::json(
                200,
                json!([
                    {"input": {"url": "https://www.amazon.com/dp/B2"}, "error": "Product not found", "error_code": "dead_page"},
                    {"input": {"url": "https://www.amazon.com/dp/B1"}, "title": "First"}
                ]),
            ),
        );

    let urls = ["https://www.amazon.com/dp/B1", "https://www.amazon.com/dp/B2"];
    let results = server
        .client()
        .datasets()
        .collect_urls(&catalog::AMAZON_PRODUCTS, &urls)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results[0].success);
    assert_eq!(results[0].data.as_ref().unwrap()["title"], "First");
    assert!(!results[1].success);
    assert_eq!(results[1].url.as_deref(), Some(urls[1]));
    assert!(results[1].error.as_deref().unwrap().contains("Product not found"));
    for result in &results {
        assert_eq!(result.cost, Decimal::from_str("0.001").ok());
        assert_eq!(result.snapshot_id.as_ref().unwrap().as_str(), "s_batch");
    }

    let body = server.requests_to(TRIGGER)[0].json();
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn collect_urls_rejects_empty_list() {
    let server = StubServer::start().await;
    let urls: [&str; 0] = [];
    let err = server
        .client()
        .datasets()
        .collect_urls(&catalog::AMAZON_PRODUCTS, &urls)
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn failed_snapshot_is_recorded_in_result() {
    let server = StubServer::start().await;
    server
        .on("POST", TRIGGER, Canned::json(200, json!({"snapshot_id": "s_fail"})))
        .on(
            "GET",
            &progress("s_fail"),
            Canned::json(200, json!({"status": "failed", "error": "Dataset input invalid"})),
        );

    let result = server
        .client()
        .datasets()
        .collect(amazon_request(&["https://www.amazon.com/dp/B0CRMZHDG8"]))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.status, ResultStatus::Failed);
    assert_eq!(result.error.as_deref(), Some("Dataset input invalid"));
    assert!(server.requests_to(&snapshot("s_fail")).is_empty());
    assert!(matches!(
        result.into_data(),
        Err(SdkError::Job(JobError::Failed { .. }))
    ));
}

#[tokio::test]
async fn poll_timeout_keeps_snapshot_for_resume() {
    let server = StubServer::start().await;
    server
        .on("POST", TRIGGER, Canned::json(200, json!({"snapshot_id": "s_slow"})))
        .on("GET", &progress("s_slow"), Canned::json(200, json!({"status": "running"})));

    let client = server.client();
    let request = amazon_request(&["https://www.amazon.com/dp/B0CRMZHDG8"])
        .poll_interval(Duration::from_millis(10))
        .timeout(Duration::from_millis(50));
    let result = client.datasets().collect(request).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.status, ResultStatus::Timeout);
    assert!(result.error.as_deref().unwrap().to_lowercase().contains("timeout"));
    let snapshot_id = result.snapshot_id.clone().unwrap();
    assert_eq!(snapshot_id.as_str(), "s_slow");

    server
        .on("GET", &progress("s_slow"), Canned::json(200, json!({"status": "ready"})))
        .on("GET", &snapshot("s_slow"), Canned::json(200, json!([{"title": "late"}])));

    let resumed = client
        .datasets()
        .resume(snapshot_id, &catalog::AMAZON_PRODUCTS)
        .to_result(&fast_poll())
        .await
        .unwrap();
    assert!(resumed.success);
    assert_eq!(resumed.data.unwrap()[0]["title"], "late");
}

#[tokio::test]
async fn empty_snapshot_id_is_an_error() {
    let server = StubServer::start().await;
    server.on("POST", TRIGGER, Canned::json(200, json!({})));

    let err = server
        .client()
        .datasets()
        .trigger(&amazon_request(&["https://www.amazon.com/dp/B0CRMZHDG8"]))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Job(JobError::EmptySnapshotId)));
}

#[tokio::test]
async fn unauthorized_trigger_is_auth_error() {
    let server = StubServer::start().await;
    server.on("POST", TRIGGER, Canned::new(401, "Invalid token"));

    let err = server
        .client()
        .datasets()
        .collect(amazon_request(&["https://www.amazon.com/dp/B0CRMZHDG8"]))
        .await
        .unwrap_err();
    assert!(err.is_auth());
    assert!(matches!(err, SdkError::Http(HttpError::Unauthorized(_))));
}

#[tokio::test]
async fn invalid_url_never_reaches_the_api() {
    let server = StubServer::start().await;
    let err = server
        .client()
        .datasets()
        .collect(amazon_request(&["amazon.com/dp/B0CRMZHDG8"]))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn fetch_before_ready_is_not_ready_error() {
    let server = StubServer::start().await;
    server.on("GET", &snapshot("s_building"), Canned::json(202, json!({"status": "building"})));

    let err = server
        .client()
        .datasets()
        .fetch(&SnapshotId::from("s_building"))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Http(HttpError::DataNotReady { status: 202 })));
    assert!(err.to_string().contains("not ready yet"));
}

#[tokio::test]
async fn fetch_accepts_ndjson() {
    let server = StubServer::start().await;
    server.on(
        "GET",
        &snapshot("s_nd"),
        Canned::new(200, "{\"id\":1}\n{\"id\":2}\n"),
    );

    let rows = server
        .client()
        .datasets()
        .fetch(&SnapshotId::from("s_nd"))
        .await
        .unwrap();
    assert_eq!(rows, vec![json!({"id": 1}), json!({"id": 2})]);
    assert_eq!(
        server.requests_to(&snapshot("s_nd"))[0].query_param("format").as_deref(),
        Some("json")
    );
}

#[tokio::test]
async fn status_parses_progress() {
    let server = StubServer::start().await;
    server.on("GET", &progress("s_stat"), Canned::json(200, json!({"status": "building"})));

    let status = server
        .client()
        .datasets()
        .status(&SnapshotId::from("s_stat"))
        .await
        .unwrap();
    assert_eq!(status, SnapshotStatus::Running);
    assert!(!status.is_terminal());
}

#[tokio::test]
async fn progress_retries_gateway_errors() {
    let server = StubServer::start().await;
    server
        .on("GET", &progress("s_flaky"), Canned::new(503, "busy"))
        .on("GET", &progress("s_flaky"), Canned::json(200, json!({"status": "ready"})));

    let status = server
        .client()
        .datasets()
        .status(&SnapshotId::from("s_flaky"))
        .await
        .unwrap();
    assert_eq!(status, SnapshotStatus::Ready);
    assert_eq!(server.requests_to(&progress("s_flaky")).len(), 2);
}

#[tokio::test]
async fn keyword_discovery_sends_discovery_flags() {
    let server = StubServer::start().await;
    server.on("POST", TRIGGER, Canned::json(200, json!({"snapshot_id": "s_disc"})));

    let request = CollectRequest::keywords(&catalog::TIKTOK_POSTS_BY_KEYWORD, ["#rustlang"])
        .country("us".to_string())
        .limit_per_input(25);
    let job = server.client().datasets().trigger(&request).await.unwrap();
    assert_eq!(job.snapshot_id.as_str(), "s_disc");
    assert_eq!(job.platform.as_deref(), Some("tiktok"));

    let trigger = &server.requests_to(TRIGGER)[0];
    assert_eq!(trigger.query_param("dataset_id").as_deref(), Some("gd_lu702nij2f790tmv9h"));
    assert_eq!(trigger.query_param("type").as_deref(), Some("discover_new"));
    assert_eq!(trigger.query_param("discover_by").as_deref(), Some("keyword"));
    assert_eq!(trigger.query_param("limit_per_input").as_deref(), Some("25"));
    assert_eq!(
        trigger.json(),
        json!([{"search_keyword": "#rustlang", "country": "US"}])
    );
}

#[tokio::test]
async fn perplexity_prompts_use_fixed_url() {
    let server = StubServer::start().await;
    server
        .on("POST", TRIGGER, Canned::json(200, json!({"snapshot_id": "s_ppl"})))
        .on("GET", &progress("s_ppl"), Canned::json(200, json!({"status": "ready"})))
        .on(
            "GET",
            &snapshot("s_ppl"),
            Canned::json(200, json!({"prompt": "what is rust", "answer_text": "A language."})),
        );

    let request = CollectRequest::prompts(&catalog::PERPLEXITY_SEARCH, ["what is rust"])
        .poll_interval(Duration::from_millis(10));
    let result = server.client().datasets().collect(request).await.unwrap();
    let answer: PerplexityAnswer = result.record().unwrap();
    assert_eq!(answer.answer_text.as_deref(), Some("A language."));

    let body = server.requests_to(TRIGGER)[0].json();
    assert_eq!(body[0]["url"], "https://www.perplexity.ai");
    assert_eq!(body[0]["country"], "US");
}

#[tokio::test]
async fn collect_urls_duplicate_inputs_each_get_a_row() {
    let server = StubServer::start().await;
    server
        .on("POST", TRIGGER, Canned::json(200, json!({"snapshot_id": "s_dup"})))
        .on("GET", &progress("s_dup"), Canned::json(200, json!({"status": "ready"})))
        .on(
            "GET",
            &snapshot("s_dup"),
            Canned::json(
                200,
                json!([
                    {"input": {"url": "https://a.test/1"}, "title": "first"},
                    {"input": {"url": "https://a.test/1"}, "title": "second"}
                ]),
            ),
        );

    let results = server
        .client()
        .datasets()
        .collect_urls(&catalog::AMAZON_PRODUCTS, &["https://a.test/1", "https://a.test/1"])
        .await
        .unwrap();

    assert!(results.iter().all(|r| r.success));
    assert_eq!(results[0].data.as_ref().unwrap()["title"], "first");
    assert_eq!(results[1].data.as_ref().unwrap()["title"], "second");
}

#[tokio::test]
async fn collect_each_triggers_one_snapshot_per_url() {
    let server = StubServer::start().await;
    server
        .on("POST", TRIGGER, Canned::json(200, json!({"snapshot_id": "s_each_1"})))
        .on("POST", TRIGGER, Canned::json(200, json!({"snapshot_id": "s_each_2"})))
        .on("GET", &progress("s_each_1"), Canned::json(200, json!({"status": "ready"})))
        .on("GET", &progress("s_each_2"), Canned::json(200, json!({"status": "ready"})))
        .on("GET", &snapshot("s_each_1"), Canned::json(200, json!([{"title": "one"}])))
        .on("GET", &snapshot("s_each_2"), Canned::json(200, json!([{"title": "two"}])));

    // One collection at a time so the trigger queue lines up with the inputs.
    let client = server.client_with(|b| b.max_concurrency(1));
    let urls = ["https://a.test/1", "https://a.test/2", "not a url"];
    let results = client
        .datasets()
        .collect_each(&catalog::AMAZON_PRODUCTS, &urls)
        .await
        .unwrap();

    let triggers = server.requests_to(TRIGGER);
    assert_eq!(triggers.len(), 2);
    assert_eq!(triggers[0].json(), json!([{"url": "https://a.test/1"}]));
    assert_eq!(triggers[1].json(), json!([{"url": "https://a.test/2"}]));

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].url.as_deref(), Some("https://a.test/1"));
    assert_eq!(results[0].snapshot_id.as_ref().unwrap().as_str(), "s_each_1");
    assert_eq!(results[0].data.as_ref().unwrap()["title"], "one");
    assert_eq!(results[0].cost, Decimal::from_str("0.001").ok());
    assert_eq!(results[1].snapshot_id.as_ref().unwrap().as_str(), "s_each_2");
    assert_eq!(results[1].data.as_ref().unwrap()["title"], "two");
    assert!(!results[2].success);
    assert_eq!(results[2].url.as_deref(), Some("not a url"));
    assert_eq!(results[2].platform.as_deref(), Some("amazon"));
}

#[tokio::test]
async fn collect_each_aborts_on_auth_error() {
    let server = StubServer::start().await;
    server.on("POST", TRIGGER, Canned::new(403, "Forbidden"));

    let err = server
        .client()
        .datasets()
        .collect_each(&catalog::AMAZON_PRODUCTS, &["https://a.test/1", "https://a.test/2"])
        .await
        .unwrap_err();
    assert!(err.is_auth());
}

#[tokio::test]
async fn rate_limited_progress_honours_retry_after() {
    let server = StubServer::start().await;
    server
        .on(
            "GET",
            &progress("s_limited"),
            Canned::new(429, "slow down").header("retry-after", "1"),
        )
        .on("GET", &progress("s_limited"), Canned::json(200, json!({"status": "ready"})));

    let started = Instant::now();
    let status = server
        .client()
        .datasets()
        .status(&SnapshotId::from("s_limited"))
        .await
        .unwrap();

    assert_eq!(status, SnapshotStatus::Ready);
    assert_eq!(server.requests_to(&progress("s_limited")).len(), 2);
    // Backoff alone would wait at most 250ms before the first retry.
    assert!(started.elapsed() >= Duration::from_millis(900));
}
