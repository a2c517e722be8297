//! # Bright Data SDK
//!
//! A Rust client for the Bright Data scraping API: dataset collections,
//! the Web Unlocker and search engine (SERP) zones.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core**: Newtypes, configuration, errors, result objects, normalization
//! 2. **HTTP API**: `BrightDataHttp` with one method per endpoint and per-endpoint retry policies
//! 3. **Services**: Dataset trigger/poll/fetch workflow, Web Unlocker, SERP
//! 4. **High-Level Client**: `BrightDataClient` with nested sub-clients
//! 5. **Blocking**: `BlockingClient` for callers without an async runtime (feature `blocking`)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brightdata_sdk::prelude::*;
//!
//! let client = BrightDataClient::from_env()?;
//!
//! let page = client.scrape_url("https://example.com").await?;
//! let serp = client.search().google("rust async", &SearchOptions::default()).await?;
//!
//! let product = client
//!     .datasets()
//!     .collect_url(&catalog::AMAZON_PRODUCTS, "https://www.amazon.com/dp/B0CRMZHDG8")
//!     .await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and per-item parameter broadcasting.
pub mod shared;

/// Unified SDK error types.
pub mod error;

/// API base URL and endpoint paths.
pub mod network;

/// Client configuration: defaults and environment loading.
pub mod config;

/// Result objects returned by every scraping operation.
pub mod result;

/// Normalization of heterogeneous response bodies.
pub mod normalize;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
pub mod http;

// ── Layer 3: Services ────────────────────────────────────────────────────────

/// Service modules: datasets, unlocker, serp.
pub mod domain;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `BrightDataClient`: the primary entry point.
pub mod client;

// ── Layer 5: Blocking ────────────────────────────────────────────────────────

/// Blocking facade over `BrightDataClient`.
#[cfg(feature = "blocking")]
pub mod blocking;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{ApiToken, DatasetId, PerItem, ResponseId, SnapshotId, ZoneName};

    // Results
    pub use crate::result::{ResultStatus, ScrapeMethod, ScrapeResult, SearchResult, Timing};

    // Datasets
    pub use crate::domain::datasets::catalog::{self, DatasetSpec, InputKind};
    pub use crate::domain::datasets::records::{
        AmazonProduct, ChatGptAnswer, Citation, PerplexityAnswer,
    };
    pub use crate::domain::datasets::{
        CollectRequest, PollConfig, ScrapeJob, SnapshotStatus, TriggerOptions,
    };

    // Unlocker + SERP
    pub use crate::domain::serp::{Device, SearchEngine, SearchOptions, SerpEntry};
    pub use crate::domain::unlocker::{
        DataFormat, RequestMode, ResponseFormat, UnblockerStatus, UnlockerOptions,
    };

    // Errors
    pub use crate::error::{HttpError, JobError, SdkError};

    // Network + config
    pub use crate::config::ClientConfig;
    pub use crate::network::DEFAULT_API_URL;

    // HTTP client + sub-clients
    pub use crate::client::{
        BrightDataClient, BrightDataClientBuilder, DatasetsClient, SearchClient, UnlockerClient,
    };
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    #[cfg(feature = "blocking")]
    pub use crate::blocking::BlockingClient;
}
