//! Canned-response HTTP stub for integration tests.
//!
//! Responses are queued per `"METHOD /path"`. Each request pops the next
//! response; the last one stays in place and answers every later request.
//! All requests are recorded for assertions.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use brightdata_sdk::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_TOKEN: &str = "test_token_123456789";

#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Canned {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            delay: None,
        }
    }

    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::new(status, body.to_string()).header("content-type", "application/json")
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Hold the response back for `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }

    pub fn query_param(&self, key: &str) -> Option<String> {
        self.query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == key).then(|| v.to_string())
        })
    }
}

#[derive(Default)]
struct Routes {
    canned: HashMap<String, VecDeque<Canned>>,
    recorded: Vec<Recorded>,
    in_flight: usize,
    peak_in_flight: usize,
}

type Shared = Arc<Mutex<Routes>>;

#[derive(Clone)]
pub struct StubServer {
    pub base_url: String,
    routes: Shared,
}

impl StubServer {
    /// Bind to an ephemeral port on the current tokio runtime.
    pub async fn start() -> Self {
        let routes: Shared = Arc::new(Mutex::new(Routes::default()));
        let app = Router::new().fallback(handle).with_state(routes.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}"),
            routes,
        }
    }

    /// Run the server on its own thread, for callers without a runtime.
    pub fn start_background() -> Self {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                tx.send(StubServer::start().await).unwrap();
                std::future::pending::<()>().await;
            });
        });
        rx.recv().unwrap()
    }

    pub fn on(&self, method: &str, path: &str, response: Canned) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .canned
            .entry(format!("{method} {path}"))
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.routes.lock().unwrap().recorded.clone()
    }

    /// Most requests the server was handling at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.routes.lock().unwrap().peak_in_flight
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn client(&self) -> BrightDataClient {
        self.client_with(|b| b)
    }

    pub fn client_with(
        &self,
        configure: impl FnOnce(BrightDataClientBuilder) -> BrightDataClientBuilder,
    ) -> BrightDataClient {
        configure(
            BrightDataClient::builder()
                .token(TEST_TOKEN)
                .base_url(&self.base_url)
                .request_timeout(Duration::from_secs(5)),
        )
        .build()
        .unwrap()
    }
}

async fn handle(
    State(routes): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let canned = {
        let mut routes = routes.lock().unwrap();
        routes.in_flight += 1;
        routes.peak_in_flight = routes.peak_in_flight.max(routes.in_flight);
        routes.recorded.push(Recorded {
            method: method.to_string(),
            path: path.clone(),
            query: uri.query().unwrap_or_default().to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect(),
            body: String::from_utf8_lossy(&body).to_string(),
        });
        routes
            .canned
            .get_mut(&format!("{method} {path}"))
            .and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            })
    };

    if let Some(delay) = canned.as_ref().and_then(|c| c.delay) {
        tokio::time::sleep(delay).await;
    }
    routes.lock().unwrap().in_flight -= 1;

    let Some(canned) = canned else {
        return (StatusCode::NOT_FOUND, format!("no stub for {method} {path}")).into_response();
    };

    let mut response = (StatusCode::from_u16(canned.status).unwrap(), canned.body).into_response();
    for (name, value) in canned.headers {
        response.headers_mut().insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(&value).unwrap(),
        );
    }
    response
}

/// Poll settings that keep tests fast.
pub fn fast_poll() -> PollConfig {
    PollConfig::new(Duration::from_millis(10), Duration::from_secs(2))
}
