//! High-level client: `BrightDataClient` with nested sub-client accessors.
//!
//! Each service has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, the shared HTTP client and the accessors.

use crate::config::ClientConfig;
use crate::domain::datasets::client::Datasets;
use crate::domain::serp::client::Search;
use crate::domain::unlocker::client::Unlocker;
use crate::domain::unlocker::UnlockerOptions;
use crate::error::{HttpError, SdkError};
use crate::http::{BrightDataHttp, RetryPolicy};
use crate::result::ScrapeResult;
use crate::shared::{ApiToken, ZoneName};
use std::time::Duration;

// Re-export sub-client types for convenience.
pub use crate::domain::datasets::client::Datasets as DatasetsClient;
pub use crate::domain::serp::client::Search as SearchClient;
pub use crate::domain::unlocker::client::Unlocker as UnlockerClient;

/// The primary entry point for the Bright Data SDK.
///
/// Provides nested sub-client accessors for each service:
/// `client.datasets()`, `client.unlocker()`, `client.search()`.
#[derive(Debug, Clone)]
pub struct BrightDataClient {
    pub(crate) http: BrightDataHttp,
    pub(crate) config: ClientConfig,
}

impl BrightDataClient {
    pub fn builder() -> BrightDataClientBuilder {
        BrightDataClientBuilder::default()
    }

    /// Build from `BRIGHTDATA_*` environment variables.
    pub fn from_env() -> Result<Self, SdkError> {
        Self::from_config(ClientConfig::from_env()?, RetryPolicy::None)
    }

    pub fn from_config(config: ClientConfig, post_retry: RetryPolicy) -> Result<Self, SdkError> {
        config.validate()?;
        let http = BrightDataHttp::new(
            &config.base_url,
            config.token.clone(),
            config.request_timeout,
            post_retry,
        )?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn datasets(&self) -> Datasets<'_> {
        Datasets { client: self }
    }

    pub fn unlocker(&self) -> Unlocker<'_> {
        Unlocker { client: self }
    }

    pub fn search(&self) -> Search<'_> {
        Search { client: self }
    }

    // ── Shortcuts ────────────────────────────────────────────────────────

    /// Whether the token is accepted. Rejections are `false`; anything
    /// else unexpected is an error.
    pub async fn test_connection(&self) -> Result<bool, SdkError> {
        match self.http.active_zones_status().await? {
            200..=299 => Ok(true),
            401 | 403 => {
                tracing::warn!("API token was rejected");
                Ok(false)
            }
            status => Err(HttpError::from_status(status, String::new(), None).into()),
        }
    }

    /// Fetch a page through the default unlocker zone.
    pub async fn scrape_url(&self, url: &str) -> Result<ScrapeResult, SdkError> {
        self.unlocker().scrape(url, &UnlockerOptions::default()).await
    }

    pub async fn scrape_urls<S: AsRef<str>>(&self, urls: &[S]) -> Result<Vec<ScrapeResult>, SdkError> {
        self.unlocker()
            .scrape_many(urls, &UnlockerOptions::default())
            .await
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct BrightDataClientBuilder {
    token: Option<ApiToken>,
    base_url: Option<String>,
    web_unlocker_zone: Option<ZoneName>,
    serp_zone: Option<ZoneName>,
    request_timeout: Option<Duration>,
    max_concurrency: Option<usize>,
    retry: RetryPolicy,
}

impl BrightDataClientBuilder {
    pub fn token(mut self, token: impl Into<ApiToken>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    pub fn web_unlocker_zone(mut self, zone: impl Into<ZoneName>) -> Self {
        self.web_unlocker_zone = Some(zone.into());
        self
    }

    pub fn serp_zone(mut self, zone: impl Into<ZoneName>) -> Self {
        self.serp_zone = Some(zone.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n);
        self
    }

    /// Retry policy for trigger and `/request` POSTs. Reads always retry.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn build(self) -> Result<BrightDataClient, SdkError> {
        let token = self.token.ok_or_else(|| {
            SdkError::Config("API token is required; call .token(..) or use from_env()".into())
        })?;

        let mut config = ClientConfig::new(token);
        if let Some(url) = self.base_url {
            config.base_url = url;
        }
        if let Some(zone) = self.web_unlocker_zone {
            config.web_unlocker_zone = zone;
        }
        if let Some(zone) = self.serp_zone {
            config.serp_zone = zone;
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout = timeout;
        }
        if let Some(n) = self.max_concurrency {
            config.max_concurrency = n;
        }

        BrightDataClient::from_config(config, self.retry)
    }
}
