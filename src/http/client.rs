//! Low-level HTTP client: `BrightDataHttp`.
//!
//! One method per API endpoint. Returns wire types or raw bodies; building
//! result objects happens in the service layer.

use crate::domain::datasets::wire::{ProgressResponse, TriggerResponse};
use crate::domain::datasets::TriggerOptions;
use crate::error::HttpError;
use crate::http::retry::{parse_retry_after, RetryPolicy};
use crate::network;
use crate::shared::{ApiToken, DatasetId, ResponseId, SnapshotId, ZoneName};

use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

const SDK_USER_AGENT: &str = concat!("brightdata-sdk-rust/", env!("CARGO_PKG_VERSION"));

/// A response whose status has not been judged yet.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Turn any non-2xx status into the matching `HttpError`.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if (200..300).contains(&self.status) {
            return Ok(self);
        }
        let retry_after_ms = parse_retry_after(self.header(RETRY_AFTER.as_str()));
        Err(HttpError::from_status(self.status, self.body, retry_after_ms))
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_str(&self.body).map_err(|e| HttpError::ServerError {
            status: self.status,
            body: format!("unexpected response body ({e}): {}", truncate(&self.body, 200)),
        })
    }
}

/// Low-level HTTP client for the Bright Data REST API.
#[derive(Clone)]
pub struct BrightDataHttp {
    base_url: String,
    client: Client,
    /// NEVER logged; `ApiToken` redacts itself.
    token: ApiToken,
    /// Policy for POSTs that start remote work.
    post_retry: RetryPolicy,
}

impl BrightDataHttp {
    pub fn new(
        base_url: &str,
        token: ApiToken,
        timeout: Duration,
        post_retry: RetryPolicy,
    ) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token,
            post_retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Datasets ─────────────────────────────────────────────────────────

    pub async fn trigger_dataset(
        &self,
        dataset_id: &DatasetId,
        inputs: &[Map<String, Value>],
        options: &TriggerOptions,
    ) -> Result<TriggerResponse, HttpError> {
        let url = with_query(
            &format!("{}{}", self.base_url, network::TRIGGER_PATH),
            &trigger_query(dataset_id, options),
        );
        self.send(Method::POST, &url, Some(&inputs), self.post_retry.clone())
            .await?
            .error_for_status()?
            .json()
    }

    pub async fn snapshot_progress(
        &self,
        snapshot_id: &SnapshotId,
    ) -> Result<ProgressResponse, HttpError> {
        let url = format!(
            "{}{}/{}",
            self.base_url,
            network::PROGRESS_PATH,
            urlencoding::encode(snapshot_id.as_str())
        );
        self.send(Method::GET, &url, None::<&()>, RetryPolicy::Idempotent)
            .await?
            .error_for_status()?
            .json()
    }

    /// Raw snapshot body. 202 means the snapshot is still building.
    pub async fn snapshot_data(&self, snapshot_id: &SnapshotId) -> Result<String, HttpError> {
        let url = with_query(
            &format!(
                "{}{}/{}",
                self.base_url,
                network::SNAPSHOT_PATH,
                urlencoding::encode(snapshot_id.as_str())
            ),
            &[("format", "json".to_string())],
        );
        let resp = self
            .send(Method::GET, &url, None::<&()>, RetryPolicy::Idempotent)
            .await?
            .error_for_status()?;
        if resp.status == 202 {
            return Err(HttpError::DataNotReady { status: 202 });
        }
        Ok(resp.body)
    }

    // ── Web Unlocker / SERP ──────────────────────────────────────────────

    /// Synchronous `/request` call; the body is the target page or JSON envelope.
    pub async fn request<B: Serialize>(&self, body: &B) -> Result<String, HttpError> {
        let url = format!("{}{}", self.base_url, network::REQUEST_PATH);
        let resp = self
            .send(Method::POST, &url, Some(body), self.post_retry.clone())
            .await?
            .error_for_status()?;
        Ok(resp.body)
    }

    pub async fn unblocker_trigger<B: Serialize>(
        &self,
        zone: &ZoneName,
        body: &B,
    ) -> Result<ResponseId, HttpError> {
        let url = with_query(
            &format!("{}{}", self.base_url, network::UNBLOCKER_TRIGGER_PATH),
            &[("zone", zone.to_string())],
        );
        let resp = self
            .send(Method::POST, &url, Some(body), self.post_retry.clone())
            .await?
            .error_for_status()?;
        resp.header(network::RESPONSE_ID_HEADER)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ResponseId::from)
            .ok_or(HttpError::MissingHeader(network::RESPONSE_ID_HEADER))
    }

    /// Status code of the pending result, without judging it.
    pub async fn unblocker_result_status(
        &self,
        zone: &ZoneName,
        response_id: &ResponseId,
    ) -> Result<u16, HttpError> {
        let url = self.unblocker_result_url(zone, response_id);
        let resp = self
            .send(Method::GET, &url, None::<&()>, RetryPolicy::Idempotent)
            .await?;
        Ok(resp.status)
    }

    pub async fn unblocker_result(
        &self,
        zone: &ZoneName,
        response_id: &ResponseId,
    ) -> Result<String, HttpError> {
        let url = self.unblocker_result_url(zone, response_id);
        let resp = self
            .send(Method::GET, &url, None::<&()>, RetryPolicy::Idempotent)
            .await?;
        match resp.status {
            200 => Ok(resp.body),
            202 => Err(HttpError::DataNotReady { status: 202 }),
            status => Err(HttpError::from_status(status, resp.body, None)),
        }
    }

    // ── Account ──────────────────────────────────────────────────────────

    pub async fn active_zones_status(&self) -> Result<u16, HttpError> {
        let url = format!("{}{}", self.base_url, network::ACTIVE_ZONES_PATH);
        let resp = self
            .send(Method::GET, &url, None::<&()>, RetryPolicy::Idempotent)
            .await?;
        Ok(resp.status)
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    fn unblocker_result_url(&self, zone: &ZoneName, response_id: &ResponseId) -> String {
        with_query(
            &format!("{}{}", self.base_url, network::UNBLOCKER_RESULT_PATH),
            &[
                ("zone", zone.to_string()),
                ("response_id", response_id.to_string()),
            ],
        )
    }

    /// Send with retries. Retryable statuses are retried; once retries run
    /// out the last response is returned for the caller to judge.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<RawResponse, HttpError> {
        let Some(config) = retry.config() else {
            return self.do_request(&method, url, body).await;
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            let can_retry = attempt < config.max_retries;
            match self.do_request(&method, url, body).await {
                Ok(resp) if can_retry && config.is_retryable_status(resp.status) => {
                    let server_delay = if resp.status == 429 {
                        parse_retry_after(resp.header(RETRY_AFTER.as_str()))
                            .map(Duration::from_millis)
                    } else {
                        None
                    };
                    let delay = server_delay.unwrap_or_else(|| config.delay_for_attempt(attempt));
                    tracing::debug!(
                        attempt = attempt + 1,
                        max = config.max_retries,
                        status = resp.status,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying request to {}",
                        url
                    );
                    futures_timer::Delay::new(delay).await;
                }
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let retryable = match &e {
                        HttpError::Reqwest(re) => re.is_connect() || re.is_timeout() || re.is_request(),
                        HttpError::Timeout => true,
                        _ => false,
                    };
                    if !retryable {
                        return Err(e);
                    }
                    if !can_retry {
                        last_error = Some(e);
                        break;
                    }
                    let delay = config.delay_for_attempt(attempt);
                    tracing::debug!(
                        attempt = attempt + 1,
                        max = config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying request to {}",
                        url
                    );
                    futures_timer::Delay::new(delay).await;
                    last_error = Some(e);
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request<B: Serialize + ?Sized>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<RawResponse, HttpError> {
        let mut req = self
            .client
            .request(method.clone(), url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token.expose()))
            .header(ACCEPT, "application/json, text/plain, */*")
            .header(USER_AGENT, SDK_USER_AGENT);

        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout
            } else {
                HttpError::Reqwest(e)
            }
        })?;
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.text().await?;

        tracing::debug!(method = %method, status, bytes = body.len(), "{}", url);

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for BrightDataHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrightDataHttp")
            .field("base_url", &self.base_url)
            .field("token", &self.token)
            .finish()
    }
}

fn trigger_query(dataset_id: &DatasetId, options: &TriggerOptions) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("dataset_id", dataset_id.to_string()),
        ("include_errors", options.include_errors.to_string()),
    ];
    if let Some(discover_by) = &options.discover_by {
        params.push(("type", "discover_new".to_string()));
        params.push(("discover_by", discover_by.clone()));
    }
    if let Some(limit) = options.limit_per_input {
        params.push(("limit_per_input", limit.to_string()));
    }
    params
}

/// Append URL-encoded query parameters.
pub(crate) fn with_query(url: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{query}")
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
