//! Web Unlocker: fetch any page through an unlocker zone, synchronously or
//! through the async request/result pair.

pub mod client;
pub mod wire;

use crate::config::{DEFAULT_ASYNC_POLL_INTERVAL, DEFAULT_ASYNC_TIMEOUT};
use crate::domain::datasets::PollConfig;
use crate::shared::ZoneName;
use serde::{Deserialize, Serialize};

/// Shape of the `/request` response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// The target page as-is.
    #[default]
    Raw,
    /// An envelope with `status_code`, `headers` and `body`.
    Json,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Raw => "raw",
            ResponseFormat::Json => "json",
        }
    }
}

/// What the zone renders the page into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    #[default]
    Html,
    Markdown,
    Screenshot,
}

impl DataFormat {
    /// Value of the `data_format` field; HTML is the zone default and is not sent.
    pub fn wire_value(&self) -> Option<&'static str> {
        match self {
            DataFormat::Html => None,
            DataFormat::Markdown => Some("markdown"),
            DataFormat::Screenshot => Some("screenshot"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// One blocking `/request` call.
    #[default]
    Sync,
    /// Trigger through `/unblocker/req`, then poll `/unblocker/get_result`.
    Async,
}

/// State of an async unlocker request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnblockerStatus {
    Ready,
    Pending,
    /// Any other HTTP status from the result endpoint.
    Error(u16),
}

impl UnblockerStatus {
    pub fn from_http(status: u16) -> Self {
        match status {
            200 => UnblockerStatus::Ready,
            202 => UnblockerStatus::Pending,
            other => UnblockerStatus::Error(other),
        }
    }
}

/// Per-call Web Unlocker settings.
#[derive(Debug, Clone, PartialEq)]
pub struct UnlockerOptions {
    /// Falls back to the client's unlocker zone.
    pub zone: Option<ZoneName>,
    pub format: ResponseFormat,
    pub method: String,
    pub country: Option<String>,
    pub data_format: DataFormat,
    pub mode: RequestMode,
    /// Used in async mode only.
    pub poll: PollConfig,
}

impl Default for UnlockerOptions {
    fn default() -> Self {
        Self {
            zone: None,
            format: ResponseFormat::Raw,
            method: "GET".to_string(),
            country: None,
            data_format: DataFormat::Html,
            mode: RequestMode::Sync,
            poll: PollConfig::new(DEFAULT_ASYNC_POLL_INTERVAL, DEFAULT_ASYNC_TIMEOUT),
        }
    }
}

impl UnlockerOptions {
    pub fn zone(mut self, zone: impl Into<ZoneName>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn data_format(mut self, data_format: DataFormat) -> Self {
        self.data_format = data_format;
        self
    }

    pub fn mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }
}
