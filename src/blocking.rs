//! Blocking facade over [`BrightDataClient`].
//!
//! Owns a current-thread tokio runtime and drives each async operation to
//! completion. Calling it from inside an async runtime is refused with
//! `SdkError::Runtime` instead of panicking.

use crate::client::BrightDataClient;
use crate::domain::datasets::{CollectRequest, DatasetRef, PollConfig, ScrapeJob, SnapshotStatus};
use crate::domain::serp::SearchOptions;
use crate::domain::unlocker::UnlockerOptions;
use crate::error::SdkError;
use crate::result::{ScrapeResult, SearchResult};
use crate::shared::SnapshotId;
use serde_json::Value;
use std::future::Future;
use tokio::runtime::{Builder, Handle, Runtime};

pub struct BlockingClient {
    inner: BrightDataClient,
    runtime: Runtime,
}

impl BlockingClient {
    pub fn new(inner: BrightDataClient) -> Result<Self, SdkError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SdkError::Runtime(format!("failed to start runtime: {e}")))?;
        Ok(Self { inner, runtime })
    }

    pub fn from_env() -> Result<Self, SdkError> {
        Self::new(BrightDataClient::from_env()?)
    }

    /// The async client underneath.
    pub fn async_client(&self) -> &BrightDataClient {
        &self.inner
    }

    fn block_on<F, T>(&self, fut: F) -> Result<T, SdkError>
    where
        F: Future<Output = Result<T, SdkError>>,
    {
        if Handle::try_current().is_ok() {
            return Err(SdkError::Runtime(
                "Cannot call blocking method from async context. Use BrightDataClient instead."
                    .into(),
            ));
        }
        self.runtime.block_on(fut)
    }

    // ── Web Unlocker ─────────────────────────────────────────────────────

    pub fn scrape_url(&self, url: &str) -> Result<ScrapeResult, SdkError> {
        self.block_on(self.inner.scrape_url(url))
    }

    pub fn scrape_url_with(&self, url: &str, options: &UnlockerOptions) -> Result<ScrapeResult, SdkError> {
        self.block_on(self.inner.unlocker().scrape(url, options))
    }

    pub fn scrape_urls<S: AsRef<str>>(&self, urls: &[S]) -> Result<Vec<ScrapeResult>, SdkError> {
        self.block_on(self.inner.scrape_urls(urls))
    }

    // ── SERP ─────────────────────────────────────────────────────────────

    pub fn search_google(&self, query: &str, options: &SearchOptions) -> Result<SearchResult, SdkError> {
        self.block_on(self.inner.search().google(query, options))
    }

    pub fn search_bing(&self, query: &str, options: &SearchOptions) -> Result<SearchResult, SdkError> {
        self.block_on(self.inner.search().bing(query, options))
    }

    pub fn search_yandex(&self, query: &str, options: &SearchOptions) -> Result<SearchResult, SdkError> {
        self.block_on(self.inner.search().yandex(query, options))
    }

    // ── Datasets ─────────────────────────────────────────────────────────

    pub fn collect(&self, request: CollectRequest) -> Result<ScrapeResult, SdkError> {
        self.block_on(self.inner.datasets().collect(request))
    }

    pub fn collect_url(&self, dataset: impl Into<DatasetRef>, url: &str) -> Result<ScrapeResult, SdkError> {
        self.block_on(self.inner.datasets().collect_url(dataset, url))
    }

    pub fn collect_urls<S: AsRef<str>>(
        &self,
        dataset: impl Into<DatasetRef>,
        urls: &[S],
    ) -> Result<Vec<ScrapeResult>, SdkError> {
        self.block_on(self.inner.datasets().collect_urls(dataset, urls))
    }

    pub fn collect_each<S: AsRef<str>>(
        &self,
        dataset: impl Into<DatasetRef>,
        urls: &[S],
    ) -> Result<Vec<ScrapeResult>, SdkError> {
        self.block_on(self.inner.datasets().collect_each(dataset, urls))
    }

    pub fn trigger(&self, request: &CollectRequest) -> Result<ScrapeJob, SdkError> {
        self.block_on(self.inner.datasets().trigger(request))
    }

    pub fn status(&self, snapshot_id: &SnapshotId) -> Result<SnapshotStatus, SdkError> {
        self.block_on(self.inner.datasets().status(snapshot_id))
    }

    pub fn fetch(&self, snapshot_id: &SnapshotId) -> Result<Vec<Value>, SdkError> {
        self.block_on(self.inner.datasets().fetch(snapshot_id))
    }

    /// Wait for a job from [`trigger`](Self::trigger) and fetch its rows.
    pub fn job_result(&self, job: ScrapeJob, poll: &PollConfig) -> Result<ScrapeResult, SdkError> {
        self.block_on(job.to_result(poll))
    }

    // ── Account ──────────────────────────────────────────────────────────

    pub fn test_connection(&self) -> Result<bool, SdkError> {
        self.block_on(self.inner.test_connection())
    }
}

impl std::fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingClient")
            .field("inner", &self.inner)
            .finish()
    }
}
