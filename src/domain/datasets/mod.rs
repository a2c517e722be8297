//! Dataset collections: trigger a remote scraper, poll its snapshot, fetch rows.

pub mod catalog;
pub mod client;
pub mod job;
pub mod records;
pub mod wire;

pub use catalog::{DatasetSpec, InputKind};
pub use job::ScrapeJob;

use crate::config::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT_MEDIUM};
use crate::error::SdkError;
use crate::shared::{DatasetId, PerItem};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

// ─── SnapshotStatus ──────────────────────────────────────────────────────────

/// Progress of a snapshot as reported by the progress endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SnapshotStatus {
    Starting,
    Running,
    Ready,
    Failed,
    Unknown(String),
}

impl SnapshotStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SnapshotStatus::Ready | SnapshotStatus::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            SnapshotStatus::Starting => "starting",
            SnapshotStatus::Running => "running",
            SnapshotStatus::Ready => "ready",
            SnapshotStatus::Failed => "failed",
            SnapshotStatus::Unknown(s) => s,
        }
    }
}

impl From<&str> for SnapshotStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "starting" | "pending" | "queued" => SnapshotStatus::Starting,
            "running" | "building" | "collecting" | "in_progress" => SnapshotStatus::Running,
            "ready" | "done" | "complete" | "completed" => SnapshotStatus::Ready,
            "failed" | "error" => SnapshotStatus::Failed,
            other => SnapshotStatus::Unknown(other.to_string()),
        }
    }
}

impl From<String> for SnapshotStatus {
    fn from(s: String) -> Self {
        SnapshotStatus::from(s.as_str())
    }
}

impl From<SnapshotStatus> for String {
    fn from(status: SnapshotStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── TriggerOptions ──────────────────────────────────────────────────────────

/// Query flags sent with a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerOptions {
    pub include_errors: bool,
    /// Discovery mode: `type=discover_new&discover_by=<value>`.
    pub discover_by: Option<String>,
    pub limit_per_input: Option<u32>,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            include_errors: true,
            discover_by: None,
            limit_per_input: None,
        }
    }
}

// ─── PollConfig ──────────────────────────────────────────────────────────────

/// How often and how long to wait for a remote job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT_MEDIUM,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    pub fn validate(&self) -> Result<(), SdkError> {
        if self.interval.is_zero() {
            return Err(SdkError::Validation("poll interval must be positive".into()));
        }
        if self.interval > self.timeout {
            return Err(SdkError::Validation(format!(
                "poll interval ({:?}) exceeds timeout ({:?})",
                self.interval, self.timeout
            )));
        }
        Ok(())
    }
}

// ─── DatasetRef ──────────────────────────────────────────────────────────────

/// A catalog entry or a bare dataset id.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetRef {
    Catalog(DatasetSpec),
    Id(DatasetId),
}

impl DatasetRef {
    pub fn dataset_id(&self) -> DatasetId {
        match self {
            DatasetRef::Catalog(spec) => DatasetId::from(spec.dataset_id),
            DatasetRef::Id(id) => id.clone(),
        }
    }

    pub fn spec(&self) -> Option<&DatasetSpec> {
        match self {
            DatasetRef::Catalog(spec) => Some(spec),
            DatasetRef::Id(_) => None,
        }
    }

    pub fn platform(&self) -> Option<&str> {
        self.spec().map(|s| s.platform)
    }

    pub fn cost_per_record(&self) -> Option<Decimal> {
        self.spec().map(|s| s.cost_per_record)
    }
}

impl From<DatasetSpec> for DatasetRef {
    fn from(spec: DatasetSpec) -> Self {
        DatasetRef::Catalog(spec)
    }
}

impl From<&DatasetSpec> for DatasetRef {
    fn from(spec: &DatasetSpec) -> Self {
        DatasetRef::Catalog(*spec)
    }
}

impl From<DatasetId> for DatasetRef {
    fn from(id: DatasetId) -> Self {
        DatasetRef::Id(id)
    }
}

impl From<&str> for DatasetRef {
    fn from(id: &str) -> Self {
        DatasetRef::Id(DatasetId::from(id))
    }
}

// ─── CollectRequest ──────────────────────────────────────────────────────────

/// Everything needed to run one dataset collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectRequest {
    pub dataset: DatasetRef,
    pub inputs: Vec<Map<String, Value>>,
    pub options: TriggerOptions,
    pub poll: PollConfig,
}

impl CollectRequest {
    /// Raw input objects, sent as-is.
    pub fn inputs(dataset: impl Into<DatasetRef>, inputs: Vec<Map<String, Value>>) -> Self {
        let dataset = dataset.into();
        let mut options = TriggerOptions::default();
        let mut poll = PollConfig::default();
        if let Some(spec) = dataset.spec() {
            options.discover_by = spec.discover_by.map(str::to_string);
            poll.timeout = spec.default_timeout;
        }
        Self {
            dataset,
            inputs,
            options,
            poll,
        }
    }

    /// One input per URL.
    pub fn urls(
        dataset: impl Into<DatasetRef>,
        urls: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let dataset = dataset.into();
        let field = primary_field(&dataset, InputKind::Url, "url");
        let inputs = urls.into_iter().map(|u| input(field, u.into())).collect();
        Self::inputs(dataset, inputs)
    }

    /// One input per keyword, for discovery datasets.
    pub fn keywords(
        dataset: impl Into<DatasetRef>,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let dataset = dataset.into();
        let field = primary_field(&dataset, InputKind::Keyword, "keyword");
        let inputs = keywords.into_iter().map(|k| input(field, k.into())).collect();
        Self::inputs(dataset, inputs)
    }

    /// One input per prompt, with the dataset's fixed URL and default country.
    pub fn prompts(
        dataset: impl Into<DatasetRef>,
        prompts: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let dataset = dataset.into();
        let field = primary_field(&dataset, InputKind::Prompt, "prompt");
        let spec = dataset.spec().copied();
        let inputs = prompts
            .into_iter()
            .map(|p| {
                let mut obj = input(field, p.into());
                if let Some(url) = spec.and_then(|s| s.fixed_url) {
                    obj.insert("url".into(), Value::from(url));
                }
                if let Some(country) = spec.and_then(|s| s.default_country) {
                    obj.insert("country".into(), Value::from(country));
                }
                obj
            })
            .collect();
        Self::inputs(dataset, inputs)
    }

    /// Set `name` on every input, broadcasting a single value or padding a short list.
    pub fn field(mut self, name: &str, values: impl Into<PerItem<Value>>) -> Self {
        let values: PerItem<Value> = values.into();
        let expanded = PerItem::expand(Some(&values), self.inputs.len(), Value::Null);
        for (obj, value) in self.inputs.iter_mut().zip(expanded) {
            if !value.is_null() {
                obj.insert(name.to_string(), value);
            }
        }
        self
    }

    /// Country per input, upper-cased.
    pub fn country(self, countries: impl Into<PerItem<String>>) -> Self {
        let values = match countries.into() {
            PerItem::Same(c) => PerItem::Same(Value::from(c.trim().to_uppercase())),
            PerItem::Each(cs) => PerItem::Each(
                cs.iter()
                    .map(|c| Value::from(c.trim().to_uppercase()))
                    .collect(),
            ),
        };
        self.field("country", values)
    }

    pub fn discover_by(mut self, by: impl Into<String>) -> Self {
        self.options.discover_by = Some(by.into());
        self
    }

    pub fn limit_per_input(mut self, limit: u32) -> Self {
        self.options.limit_per_input = Some(limit);
        self
    }

    pub fn include_errors(mut self, include: bool) -> Self {
        self.options.include_errors = include;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.poll.timeout = timeout;
        self
    }

    /// Check inputs before anything is sent.
    pub fn validate(&self) -> Result<(), SdkError> {
        if self.inputs.is_empty() {
            return Err(SdkError::Validation("at least one input is required".into()));
        }
        if self.dataset.dataset_id().is_empty() {
            return Err(SdkError::Validation("dataset id is empty".into()));
        }
        self.poll.validate()?;

        let (field, kind) = match self.dataset.spec() {
            Some(spec) => (spec.field, spec.input),
            None => ("url", InputKind::Url),
        };
        for (idx, obj) in self.inputs.iter().enumerate() {
            let value = obj.get(field).and_then(Value::as_str);
            match (kind, value) {
                (InputKind::Url, Some(url)) => validate_url(url)?,
                // Bare dataset ids may take anything.
                (InputKind::Url, None) if self.dataset.spec().is_none() => {}
                (_, Some(v)) if !v.trim().is_empty() => {}
                _ => {
                    return Err(SdkError::Validation(format!(
                        "input {idx} is missing a non-empty `{field}`"
                    )))
                }
            }
        }
        Ok(())
    }
}

fn primary_field(dataset: &DatasetRef, kind: InputKind, fallback: &'static str) -> &'static str {
    match dataset.spec() {
        Some(spec) if spec.input == kind => spec.field,
        _ => fallback,
    }
}

fn input(field: &str, value: String) -> Map<String, Value> {
    let mut obj = Map::new();
    obj.insert(field.to_string(), Value::String(value));
    obj
}

/// Absolute `http`/`https` URL with a host.
pub(crate) fn validate_url(url: &str) -> Result<(), SdkError> {
    let parsed = reqwest::Url::parse(url.trim())
        .map_err(|e| SdkError::Validation(format!("invalid URL {url:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SdkError::Validation(format!(
            "URL must use http or https: {url}"
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(SdkError::Validation(format!("URL has no host: {url}")));
    }
    Ok(())
}
