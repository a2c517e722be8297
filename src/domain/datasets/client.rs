//! Datasets sub-client: trigger, poll, fetch, collect.

use crate::client::BrightDataClient;
use crate::domain::datasets::{CollectRequest, DatasetRef, PollConfig, ScrapeJob, SnapshotStatus};
use crate::domain::settle_batch;
use crate::error::{JobError, SdkError};
use crate::normalize;
use crate::result::{ResultStatus, ScrapeMethod, ScrapeResult, Timing};
use crate::shared::SnapshotId;
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde_json::Value;

/// Sub-client for dataset collections.
pub struct Datasets<'a> {
    pub(crate) client: &'a BrightDataClient,
}

impl<'a> Datasets<'a> {
    /// Validate the request and start the remote job.
    pub async fn trigger(&self, request: &CollectRequest) -> Result<ScrapeJob, SdkError> {
        request.validate()?;
        let dataset_id = request.dataset.dataset_id();

        let mut timing = Timing {
            trigger_sent_at: Some(Utc::now()),
            ..Timing::default()
        };
        let resp = self
            .client
            .http
            .trigger_dataset(&dataset_id, &request.inputs, &request.options)
            .await?;

        let snapshot_id = SnapshotId::new(resp.snapshot_id);
        if snapshot_id.is_empty() {
            return Err(JobError::EmptySnapshotId.into());
        }
        timing.snapshot_id_received_at = Some(Utc::now());

        tracing::info!(
            dataset_id = %dataset_id,
            inputs = request.inputs.len(),
            snapshot_id = %snapshot_id,
            "Triggered collection"
        );

        Ok(
            ScrapeJob::new(self.client.http.clone(), snapshot_id, dataset_id, timing)
                .with_pricing(request.dataset.platform(), request.dataset.cost_per_record()),
        )
    }

    /// Re-attach to a snapshot triggered earlier, e.g. after a poll timeout.
    pub fn resume(&self, snapshot_id: SnapshotId, dataset: impl Into<DatasetRef>) -> ScrapeJob {
        let dataset = dataset.into();
        ScrapeJob::new(
            self.client.http.clone(),
            snapshot_id,
            dataset.dataset_id(),
            Timing::default(),
        )
        .with_pricing(dataset.platform(), dataset.cost_per_record())
    }

    pub async fn status(&self, snapshot_id: &SnapshotId) -> Result<SnapshotStatus, SdkError> {
        let progress = self.client.http.snapshot_progress(snapshot_id).await?;
        Ok(SnapshotStatus::from(progress.status.as_str()))
    }

    /// Rows of a finished snapshot. A snapshot still building yields
    /// `HttpError::DataNotReady`.
    pub async fn fetch(&self, snapshot_id: &SnapshotId) -> Result<Vec<Value>, SdkError> {
        let body = self.client.http.snapshot_data(snapshot_id).await?;
        normalize::snapshot_rows(&body)
    }

    /// Trigger, wait and fetch in one call.
    pub async fn collect(&self, request: CollectRequest) -> Result<ScrapeResult, SdkError> {
        let poll: PollConfig = request.poll;
        let job = self.trigger(&request).await?;
        job.to_result(&poll).await
    }

    /// Collect a single URL; the lone record is returned unwrapped.
    pub async fn collect_url(
        &self,
        dataset: impl Into<DatasetRef>,
        url: &str,
    ) -> Result<ScrapeResult, SdkError> {
        let batch = self.collect(CollectRequest::urls(dataset, [url])).await?;
        let urls = [url.to_string()];
        Ok(split_by_url(batch, &urls)
            .pop()
            .unwrap_or_else(|| no_data(url, Timing::default())))
    }

    /// Collect many URLs as one job and split the rows into one result per URL.
    pub async fn collect_urls<S: AsRef<str>>(
        &self,
        dataset: impl Into<DatasetRef>,
        urls: &[S],
    ) -> Result<Vec<ScrapeResult>, SdkError> {
        let urls: Vec<String> = urls.iter().map(|u| u.as_ref().to_string()).collect();
        if urls.is_empty() {
            return Err(SdkError::Validation("at least one URL is required".into()));
        }
        let request = CollectRequest::urls(dataset, urls.clone());
        self.collect_split(request, &urls).await
    }

    /// One snapshot per URL, run concurrently up to the client's
    /// `max_concurrency`. Results come back in input order.
    ///
    /// A rejected token aborts the batch; any other error fails its URL only.
    pub async fn collect_each<S: AsRef<str>>(
        &self,
        dataset: impl Into<DatasetRef>,
        urls: &[S],
    ) -> Result<Vec<ScrapeResult>, SdkError> {
        if urls.is_empty() {
            return Err(SdkError::Validation("at least one URL is required".into()));
        }
        let dataset = dataset.into();
        let outcomes = stream::iter(urls.iter())
            .map(|url| self.collect_url(dataset.clone(), url.as_ref()))
            .buffered(self.client.config.max_concurrency)
            .collect::<Vec<_>>()
            .await;

        settle_batch(outcomes, |idx, err| {
            let url = urls[idx].as_ref();
            tracing::warn!(url, error = %err, "Collection failed");
            let mut result = ScrapeResult::failed(
                ScrapeMethod::WebScraper,
                ResultStatus::Error,
                err.to_string(),
                Timing::default(),
            )
            .with_url(url);
            result.platform = dataset.platform().map(str::to_string);
            result
        })
    }

    async fn collect_split(
        &self,
        request: CollectRequest,
        urls: &[String],
    ) -> Result<Vec<ScrapeResult>, SdkError> {
        let batch = self.collect(request).await?;
        let results = split_by_url(batch, urls);
        for failed in results.iter().filter(|r| !r.success) {
            tracing::warn!(
                url = failed.url.as_deref().unwrap_or_default(),
                error = failed.error.as_deref().unwrap_or_default(),
                "Input produced no data"
            );
        }
        Ok(results)
    }
}

fn no_data(url: &str, timing: Timing) -> ScrapeResult {
    ScrapeResult::failed(ScrapeMethod::WebScraper, ResultStatus::Failed, "no data returned", timing)
        .with_url(url)
}

/// Turn one batch result into one result per input URL.
///
/// Cost is shared evenly; vendor error rows fail their URL only.
pub(crate) fn split_by_url(batch: ScrapeResult, urls: &[String]) -> Vec<ScrapeResult> {
    if urls.is_empty() {
        return Vec::new();
    }
    if !batch.success {
        return urls
            .iter()
            .map(|url| batch.clone().with_url(url.clone()))
            .collect();
    }

    let share = batch
        .cost
        .map(|c| c / Decimal::from(urls.len() as u64));
    let rows = match batch.data {
        Some(Value::Array(rows)) => rows,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other],
    };
    let groups = normalize::group_rows_by_url(urls, rows);

    urls.iter()
        .zip(groups)
        .map(|(url, group)| {
            let timing = batch.timing.clone();
            let (errors, mut data): (Vec<Value>, Vec<Value>) = group
                .into_iter()
                .partition(|row| normalize::error_record(row).is_some());

            let mut result = if data.is_empty() {
                match errors.first().and_then(normalize::error_record) {
                    Some(message) => ScrapeResult::failed(
                        ScrapeMethod::WebScraper,
                        ResultStatus::Failed,
                        message,
                        timing,
                    ),
                    None => no_data(url, timing),
                }
            } else if data.len() == 1 {
                ScrapeResult::ready(ScrapeMethod::WebScraper, data.remove(0), timing)
            } else {
                ScrapeResult::ready(ScrapeMethod::WebScraper, Value::Array(data), timing)
            };

            result.url = Some(url.clone());
            result.platform = batch.platform.clone();
            result.snapshot_id = batch.snapshot_id.clone();
            result.cost = share;
            result
        })
        .collect()
}
