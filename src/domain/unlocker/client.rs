//! Unlocker sub-client: sync and async page fetches.

use crate::client::BrightDataClient;
use crate::domain::datasets::{validate_url, PollConfig};
use crate::domain::settle_batch;
use crate::domain::unlocker::wire::UnlockerRequest;
use crate::domain::unlocker::{RequestMode, ResponseFormat, UnblockerStatus, UnlockerOptions};
use crate::error::{HttpError, JobError, SdkError};
use crate::http::BrightDataHttp;
use crate::normalize;
use crate::result::{ResultStatus, ScrapeMethod, ScrapeResult, Timing};
use crate::shared::{ResponseId, ZoneName};
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use std::time::Instant;

/// Sub-client for the Web Unlocker zone.
pub struct Unlocker<'a> {
    pub(crate) client: &'a BrightDataClient,
}

impl<'a> Unlocker<'a> {
    /// Fetch one page. Async-mode timeouts and result errors come back as
    /// unsuccessful results; transport and auth errors as `Err`.
    pub async fn scrape(&self, url: &str, options: &UnlockerOptions) -> Result<ScrapeResult, SdkError> {
        validate_url(url)?;
        let zone = self.zone(options);
        let body = request_body(&zone, url, options);
        let mut timing = Timing::started_now();

        let outcome = send(
            &self.client.http,
            &zone,
            &body,
            options.mode,
            &options.poll,
            &mut timing,
        )
        .await?;

        let result = match outcome {
            Outcome::Body(body) => {
                let data = normalize::unlocker_body(body, options.format == ResponseFormat::Json);
                ScrapeResult::ready(ScrapeMethod::WebUnlocker, data, timing)
            }
            Outcome::Timeout(message) => {
                tracing::warn!(url, zone = %zone, "{}", message);
                ScrapeResult::failed(ScrapeMethod::WebUnlocker, ResultStatus::Timeout, message, timing)
            }
            Outcome::Failed(message) => {
                tracing::warn!(url, zone = %zone, "{}", message);
                ScrapeResult::failed(ScrapeMethod::WebUnlocker, ResultStatus::Error, message, timing)
            }
        };
        Ok(result.with_url(url))
    }

    /// Fetch many pages concurrently, one result per URL in input order.
    ///
    /// A rejected token aborts the batch; any other error fails its URL only.
    pub async fn scrape_many<S: AsRef<str>>(
        &self,
        urls: &[S],
        options: &UnlockerOptions,
    ) -> Result<Vec<ScrapeResult>, SdkError> {
        let outcomes = stream::iter(urls.iter())
            .map(|url| self.scrape(url.as_ref(), options))
            .buffered(self.client.config.max_concurrency)
            .collect::<Vec<_>>()
            .await;

        settle_batch(outcomes, |idx, err| {
            let url = urls[idx].as_ref();
            tracing::warn!(url, error = %err, "Unlocker request failed");
            ScrapeResult::failed(
                ScrapeMethod::WebUnlocker,
                ResultStatus::Error,
                err.to_string(),
                Timing::default(),
            )
            .with_url(url)
        })
    }

    /// Start an async request and return its response id.
    pub async fn trigger(
        &self,
        zone: &ZoneName,
        url: &str,
        options: &UnlockerOptions,
    ) -> Result<ResponseId, SdkError> {
        validate_url(url)?;
        let body = request_body(zone, url, options);
        Ok(self.client.http.unblocker_trigger(zone, &body).await?)
    }

    /// Check an async request. HTTP statuses map onto `UnblockerStatus`.
    pub async fn status(
        &self,
        zone: &ZoneName,
        response_id: &ResponseId,
    ) -> Result<UnblockerStatus, SdkError> {
        let status = self
            .client
            .http
            .unblocker_result_status(zone, response_id)
            .await?;
        Ok(UnblockerStatus::from_http(status))
    }

    /// Body of a finished async request.
    pub async fn fetch(&self, zone: &ZoneName, response_id: &ResponseId) -> Result<String, SdkError> {
        Ok(self.client.http.unblocker_result(zone, response_id).await?)
    }

    fn zone(&self, options: &UnlockerOptions) -> ZoneName {
        options
            .zone
            .clone()
            .filter(|z| !z.is_empty())
            .unwrap_or_else(|| self.client.config.web_unlocker_zone.clone())
    }
}

pub(crate) fn request_body(zone: &ZoneName, url: &str, options: &UnlockerOptions) -> UnlockerRequest {
    UnlockerRequest {
        zone: zone.to_string(),
        url: url.to_string(),
        format: options.format.as_str(),
        method: options.method.to_uppercase(),
        country: options
            .country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_lowercase),
        data_format: options.data_format.wire_value(),
    }
}

// ─── Request execution (shared with SERP) ────────────────────────────────────

/// How a zone request ended, short of a transport error.
#[derive(Debug)]
pub(crate) enum Outcome {
    Body(String),
    Timeout(String),
    Failed(String),
}

/// Run a zone request in the given mode, recording timing along the way.
pub(crate) async fn send(
    http: &BrightDataHttp,
    zone: &ZoneName,
    body: &UnlockerRequest,
    mode: RequestMode,
    poll: &PollConfig,
    timing: &mut Timing,
) -> Result<Outcome, SdkError> {
    match mode {
        RequestMode::Sync => {
            let page = http.request(body).await?;
            timing.data_fetched_at = Some(Utc::now());
            Ok(Outcome::Body(page))
        }
        RequestMode::Async => {
            poll.validate()?;
            timing.trigger_sent_at = Some(Utc::now());
            let response_id = http.unblocker_trigger(zone, body).await?;
            timing.snapshot_id_received_at = Some(Utc::now());
            await_response(http, zone, &response_id, poll, timing).await
        }
    }
}

async fn await_response(
    http: &BrightDataHttp,
    zone: &ZoneName,
    response_id: &ResponseId,
    poll: &PollConfig,
    timing: &mut Timing,
) -> Result<Outcome, SdkError> {
    let started = Instant::now();

    loop {
        let code = http.unblocker_result_status(zone, response_id).await?;
        timing.snapshot_polled_at.push(Utc::now());
        let status = UnblockerStatus::from_http(code);
        tracing::debug!(
            response_id = %response_id,
            status = ?status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Polled async request"
        );

        match status {
            UnblockerStatus::Ready => {
                let page = http.unblocker_result(zone, response_id).await?;
                timing.data_fetched_at = Some(Utc::now());
                return Ok(Outcome::Body(page));
            }
            UnblockerStatus::Error(code @ (401 | 403)) => {
                return Err(HttpError::from_status(code, String::new(), None).into());
            }
            UnblockerStatus::Error(code) => {
                return Ok(Outcome::Failed(format!(
                    "Async request {response_id} failed with HTTP {code}"
                )));
            }
            UnblockerStatus::Pending => {}
        }

        let elapsed = started.elapsed();
        if elapsed >= poll.timeout {
            let err = JobError::Timeout {
                id: response_id.to_string(),
                waited: elapsed,
            };
            return Ok(Outcome::Timeout(err.to_string()));
        }
        futures_timer::Delay::new(poll.interval.min(poll.timeout - elapsed)).await;
    }
}
