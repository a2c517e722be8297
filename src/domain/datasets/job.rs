//! `ScrapeJob`: handle on a triggered snapshot.

use crate::domain::datasets::wire::ProgressResponse;
use crate::domain::datasets::{PollConfig, SnapshotStatus};
use crate::error::{HttpError, JobError, SdkError};
use crate::http::BrightDataHttp;
use crate::normalize;
use crate::result::{ResultStatus, ScrapeMethod, ScrapeResult, Timing};
use crate::shared::{DatasetId, SnapshotId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

/// A triggered collection. Keep it to check on, wait for or resume a snapshot.
#[derive(Debug, Clone)]
pub struct ScrapeJob {
    pub snapshot_id: SnapshotId,
    pub dataset_id: DatasetId,
    pub platform: Option<String>,
    pub cost_per_record: Option<Decimal>,
    pub triggered_at: DateTime<Utc>,
    pub(crate) timing: Timing,
    pub(crate) http: BrightDataHttp,
    failure: Option<String>,
}

impl ScrapeJob {
    pub(crate) fn new(
        http: BrightDataHttp,
        snapshot_id: SnapshotId,
        dataset_id: DatasetId,
        timing: Timing,
    ) -> Self {
        let triggered_at = timing
            .trigger_sent_at
            .or(timing.snapshot_id_received_at)
            .unwrap_or_else(Utc::now);
        Self {
            snapshot_id,
            dataset_id,
            platform: None,
            cost_per_record: None,
            triggered_at,
            timing,
            http,
            failure: None,
        }
    }

    pub(crate) fn with_pricing(mut self, platform: Option<&str>, cost: Option<Decimal>) -> Self {
        self.platform = platform.map(str::to_string);
        self.cost_per_record = cost;
        self
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Current snapshot status, without recording a poll.
    pub async fn status(&self) -> Result<SnapshotStatus, SdkError> {
        let progress = self.http.snapshot_progress(&self.snapshot_id).await?;
        Ok(SnapshotStatus::from(progress.status.as_str()))
    }

    async fn poll_once(&mut self) -> Result<ProgressResponse, SdkError> {
        let progress = self.http.snapshot_progress(&self.snapshot_id).await?;
        self.timing.snapshot_polled_at.push(Utc::now());
        Ok(progress)
    }

    /// Poll until the snapshot is ready or failed.
    ///
    /// Returns `JobError::Timeout` once `poll.timeout` has elapsed without a
    /// terminal status.
    pub async fn wait(&mut self, poll: &PollConfig) -> Result<SnapshotStatus, SdkError> {
        poll.validate()?;
        let started = Instant::now();

        loop {
            let progress = self.poll_once().await?;
            let status = SnapshotStatus::from(progress.status.as_str());
            tracing::debug!(
                snapshot_id = %self.snapshot_id,
                status = %status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Polled snapshot"
            );

            match status {
                SnapshotStatus::Ready => return Ok(status),
                SnapshotStatus::Failed => {
                    self.failure = Some(progress.failure_message());
                    return Ok(status);
                }
                _ => {}
            }

            let elapsed = started.elapsed();
            if elapsed >= poll.timeout {
                return Err(JobError::Timeout {
                    id: self.snapshot_id.to_string(),
                    waited: elapsed,
                }
                .into());
            }
            futures_timer::Delay::new(poll.interval.min(poll.timeout - elapsed)).await;
        }
    }

    /// Download and normalize the snapshot rows.
    pub async fn fetch(&mut self) -> Result<Vec<Value>, SdkError> {
        let body = self.http.snapshot_data(&self.snapshot_id).await?;
        self.timing.data_fetched_at = Some(Utc::now());
        normalize::snapshot_rows(&body)
    }

    /// Wait, fetch and fold everything into a `ScrapeResult`.
    ///
    /// Failed and timed-out snapshots become unsuccessful results that keep
    /// the snapshot id; transport errors are returned as `Err`.
    pub async fn to_result(mut self, poll: &PollConfig) -> Result<ScrapeResult, SdkError> {
        let started = Instant::now();

        match self.wait(poll).await {
            Ok(SnapshotStatus::Ready) => {}
            Ok(_) => {
                let message = self
                    .failure
                    .take()
                    .unwrap_or_else(|| "snapshot failed".to_string());
                tracing::warn!(snapshot_id = %self.snapshot_id, error = %message, "Snapshot failed");
                return Ok(self.failed(ResultStatus::Failed, message));
            }
            Err(SdkError::Job(e @ JobError::Timeout { .. })) => {
                tracing::warn!(snapshot_id = %self.snapshot_id, "{}", e);
                return Ok(self.failed(ResultStatus::Timeout, e.to_string()));
            }
            Err(e) => return Err(e),
        }

        // The progress endpoint can report ready shortly before the data is served.
        let rows = loop {
            match self.fetch().await {
                Ok(rows) => break rows,
                Err(SdkError::Http(HttpError::DataNotReady { .. }))
                    if started.elapsed() + poll.interval < poll.timeout =>
                {
                    futures_timer::Delay::new(poll.interval).await;
                }
                Err(SdkError::Http(e @ HttpError::DataNotReady { .. })) => {
                    return Ok(self.failed(ResultStatus::Timeout, e.to_string()));
                }
                Err(e) => return Err(e),
            }
        };

        let cost = self
            .cost_per_record
            .map(|c| c * Decimal::from(rows.len() as u64));
        tracing::info!(
            snapshot_id = %self.snapshot_id,
            rows = rows.len(),
            cost = ?cost,
            polls = self.timing.poll_count(),
            "Collection complete"
        );

        let mut result = ScrapeResult::ready(ScrapeMethod::WebScraper, Value::Array(rows), self.timing)
            .with_snapshot(self.snapshot_id)
            .with_cost(cost);
        result.platform = self.platform;
        Ok(result)
    }

    fn failed(self, status: ResultStatus, message: String) -> ScrapeResult {
        let mut result = ScrapeResult::failed(ScrapeMethod::WebScraper, status, message, self.timing)
            .with_snapshot(self.snapshot_id);
        result.platform = self.platform;
        result
    }
}
