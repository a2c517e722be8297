//! Result objects returned by scraping operations.
//!
//! Every operation returns a result carrying its own success flag, error
//! message, timing and cost, so batch results stay independent of each other.

use crate::domain::serp::{SearchEngine, SerpEntry};
use crate::error::{JobError, SdkError};
use crate::shared::SnapshotId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

// ─── ResultStatus ────────────────────────────────────────────────────────────

/// Final state of a scraping operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Ready,
    Failed,
    Timeout,
    Error,
}

impl ResultStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ResultStatus::Ready => "ready",
            ResultStatus::Failed => "failed",
            ResultStatus::Timeout => "timeout",
            ResultStatus::Error => "error",
        }
    }
}

/// Which Bright Data product produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeMethod {
    WebScraper,
    WebUnlocker,
    Serp,
}

impl ScrapeMethod {
    pub fn as_str(&self) -> &str {
        match self {
            ScrapeMethod::WebScraper => "web_scraper",
            ScrapeMethod::WebUnlocker => "web_unlocker",
            ScrapeMethod::Serp => "serp",
        }
    }
}

// ─── Timing ──────────────────────────────────────────────────────────────────

/// Timestamps collected while a request travels through the workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Timing {
    pub request_sent_at: Option<DateTime<Utc>>,
    pub trigger_sent_at: Option<DateTime<Utc>>,
    pub snapshot_id_received_at: Option<DateTime<Utc>>,
    pub snapshot_polled_at: Vec<DateTime<Utc>>,
    pub data_fetched_at: Option<DateTime<Utc>>,
}

impl Timing {
    pub fn started_now() -> Self {
        Self {
            request_sent_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    fn start(&self) -> Option<DateTime<Utc>> {
        self.request_sent_at.or(self.trigger_sent_at)
    }

    /// Wall time from the first request until data arrived.
    pub fn elapsed(&self) -> Option<Duration> {
        let start = self.start()?;
        let end = self.data_fetched_at?;
        (end - start).to_std().ok()
    }

    pub fn elapsed_ms(&self) -> Option<f64> {
        self.elapsed().map(|d| d.as_secs_f64() * 1000.0)
    }

    /// Number of status checks made before data was fetched.
    pub fn poll_count(&self) -> usize {
        self.snapshot_polled_at.len()
    }
}

// ─── ScrapeResult ────────────────────────────────────────────────────────────

/// Outcome of a dataset collection or Web Unlocker request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapeResult {
    pub success: bool,
    pub status: ResultStatus,
    pub method: ScrapeMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<SnapshotId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    pub timing: Timing,
}

impl ScrapeResult {
    pub fn ready(method: ScrapeMethod, data: Value, timing: Timing) -> Self {
        let row_count = match &data {
            Value::Array(rows) => Some(rows.len()),
            Value::Null => Some(0),
            _ => Some(1),
        };
        Self {
            success: true,
            status: ResultStatus::Ready,
            method,
            url: None,
            platform: None,
            data: Some(data),
            error: None,
            snapshot_id: None,
            row_count,
            cost: None,
            timing,
        }
    }

    pub fn failed(
        method: ScrapeMethod,
        status: ResultStatus,
        error: impl Into<String>,
        timing: Timing,
    ) -> Self {
        Self {
            success: false,
            status,
            method,
            url: None,
            platform: None,
            data: None,
            error: Some(error.into()),
            snapshot_id: None,
            row_count: None,
            cost: None,
            timing,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_snapshot(mut self, snapshot_id: SnapshotId) -> Self {
        self.snapshot_id = Some(snapshot_id);
        self
    }

    pub fn with_cost(mut self, cost: Option<Decimal>) -> Self {
        self.cost = cost;
        self
    }

    pub fn elapsed_ms(&self) -> Option<f64> {
        self.timing.elapsed_ms()
    }

    /// The data, or the failure as a typed error.
    pub fn into_data(self) -> Result<Value, SdkError> {
        if self.success {
            return Ok(self.data.unwrap_or(Value::Null));
        }
        let message = self.error.unwrap_or_else(|| "unknown error".to_string());
        let id = self
            .snapshot_id
            .as_ref()
            .map(|s| s.to_string())
            .or(self.url.clone())
            .unwrap_or_default();
        Err(match self.status {
            ResultStatus::Timeout => SdkError::Job(JobError::Timeout {
                id,
                waited: self.timing.start().and_then(|s| (Utc::now() - s).to_std().ok()).unwrap_or_default(),
            }),
            _ => match self.snapshot_id {
                Some(snapshot_id) => SdkError::Job(JobError::Failed {
                    snapshot_id,
                    message,
                }),
                None => SdkError::Other(message),
            },
        })
    }

    /// Rows of the result: an array is returned as-is, a single object as one row.
    pub fn rows(&self) -> Vec<&Value> {
        match &self.data {
            Some(Value::Array(rows)) => rows.iter().collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![other],
        }
    }

    /// Deserialize the single record into a typed wrapper.
    pub fn record<T: DeserializeOwned>(&self) -> Result<T, SdkError> {
        match self.rows().as_slice() {
            [row] => Ok(serde_json::from_value((*row).clone())?),
            rows => Err(SdkError::Validation(format!(
                "expected exactly one record, found {}",
                rows.len()
            ))),
        }
    }

    /// Deserialize every record into a typed wrapper.
    pub fn records<T: DeserializeOwned>(&self) -> Result<Vec<T>, SdkError> {
        self.rows()
            .into_iter()
            .map(|row| serde_json::from_value(row.clone()).map_err(SdkError::from))
            .collect()
    }

    /// Page body for Web Unlocker results in raw format.
    pub fn text(&self) -> Option<&str> {
        self.data.as_ref().and_then(Value::as_str)
    }
}

// ─── SearchResult ────────────────────────────────────────────────────────────

/// Outcome of a search engine query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub success: bool,
    pub status: ResultStatus,
    pub search_engine: SearchEngine,
    /// Query parameters as sent, `"q"` always present.
    pub query: Map<String, Value>,
    pub entries: Vec<SerpEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timing: Timing,
}

impl SearchResult {
    pub fn method(&self) -> ScrapeMethod {
        ScrapeMethod::Serp
    }

    pub fn total_found(&self) -> usize {
        self.entries.len()
    }

    pub fn query_text(&self) -> Option<&str> {
        self.query.get("q").and_then(Value::as_str)
    }
}
