//! Client configuration: defaults, validation and environment loading.

use crate::error::SdkError;
use crate::shared::{ApiToken, ZoneName};
use std::time::Duration;

/// Seconds between snapshot status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Poll budget for fast datasets (Perplexity, ChatGPT).
pub const DEFAULT_TIMEOUT_SHORT: Duration = Duration::from_secs(180);

/// Poll budget for most datasets.
pub const DEFAULT_TIMEOUT_MEDIUM: Duration = Duration::from_secs(240);

/// Poll cadence for async Web Unlocker and SERP requests.
pub const DEFAULT_ASYNC_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Poll budget for async Web Unlocker and SERP requests.
pub const DEFAULT_ASYNC_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-request HTTP timeout. Unlocker requests render full pages, so this is generous.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound on concurrent requests during batch fan-out.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

pub const DEFAULT_WEB_UNLOCKER_ZONE: &str = "sdk_unlocker";
pub const DEFAULT_SERP_ZONE: &str = "sdk_serp";

pub const MIN_TOKEN_LEN: usize = 10;

pub const ENV_API_TOKEN: &str = "BRIGHTDATA_API_TOKEN";
pub const ENV_API_KEY: &str = "BRIGHTDATA_API_KEY";
pub const ENV_WEB_UNLOCKER_ZONE: &str = "BRIGHTDATA_WEB_UNLOCKER_ZONE";
pub const ENV_SERP_ZONE: &str = "BRIGHTDATA_SERP_ZONE";
pub const ENV_API_URL: &str = "BRIGHTDATA_API_URL";

/// Resolved client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub token: ApiToken,
    pub base_url: String,
    pub web_unlocker_zone: ZoneName,
    pub serp_zone: ZoneName,
    pub request_timeout: Duration,
    pub max_concurrency: usize,
}

impl ClientConfig {
    pub fn new(token: impl Into<ApiToken>) -> Self {
        Self {
            token: token.into(),
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            web_unlocker_zone: ZoneName::from(DEFAULT_WEB_UNLOCKER_ZONE),
            serp_zone: ZoneName::from(DEFAULT_SERP_ZONE),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, SdkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SdkError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get(ENV_API_TOKEN).or_else(|| get(ENV_API_KEY)).ok_or_else(|| {
            SdkError::Config(format!(
                "No API token found. Set {ENV_API_TOKEN} or pass a token to the builder"
            ))
        })?;

        let mut config = Self::new(token);
        if let Some(zone) = get(ENV_WEB_UNLOCKER_ZONE) {
            config.web_unlocker_zone = ZoneName::new(zone.trim());
        }
        if let Some(zone) = get(ENV_SERP_ZONE) {
            config.serp_zone = ZoneName::new(zone.trim());
        }
        if let Some(url) = get(ENV_API_URL) {
            config.base_url = url.trim().to_string();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SdkError> {
        let token = self.token.expose();
        if token.is_empty() {
            return Err(SdkError::Config("API token is empty".into()));
        }
        if token.chars().any(char::is_whitespace) {
            return Err(SdkError::Config("API token contains whitespace".into()));
        }
        if token.len() < MIN_TOKEN_LEN {
            return Err(SdkError::Config(format!(
                "API token is too short ({} chars, expected at least {MIN_TOKEN_LEN})",
                token.len()
            )));
        }
        if self.web_unlocker_zone.is_empty() || self.serp_zone.is_empty() {
            return Err(SdkError::Config("Zone names must not be empty".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "Base URL must be http(s): {}",
                self.base_url
            )));
        }
        if self.max_concurrency == 0 {
            return Err(SdkError::Config("max_concurrency must be at least 1".into()));
        }
        Ok(())
    }
}
