//! Unified SDK error types.

use crate::shared::SnapshotId;
use std::time::Duration;
use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Job error: {0}")]
    Job(#[from] JobError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("{0}")]
    Other(String),
}

impl SdkError {
    /// Whether the error came from a rejected token (401/403).
    pub fn is_auth(&self) -> bool {
        matches!(self, SdkError::Http(e) if e.is_auth())
    }

    /// Whether repeating the same call later might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SdkError::Http(e) => e.is_retryable(),
            SdkError::Job(JobError::Timeout { .. }) => true,
            _ => false,
        }
    }
}

/// HTTP-layer errors, translated from vendor status codes.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Unauthorized (HTTP 401): {0}")]
    Unauthorized(String),

    #[error("Forbidden (HTTP 403): {0}")]
    Forbidden(String),

    #[error("Not found (HTTP 404): {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Result not ready yet (HTTP {status})")]
    DataNotReady { status: u16 },

    #[error("Response is missing the {0} header")]
    MissingHeader(&'static str),

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

impl HttpError {
    pub fn is_auth(&self) -> bool {
        matches!(self, HttpError::Unauthorized(_) | HttpError::Forbidden(_))
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            HttpError::RateLimited { .. }
            | HttpError::DataNotReady { .. }
            | HttpError::Timeout
            | HttpError::MaxRetriesExceeded { .. } => true,
            HttpError::ServerError { status, .. } => *status >= 500,
            HttpError::Reqwest(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Translate a non-success status and its body into an error.
    pub(crate) fn from_status(status: u16, body: String, retry_after_ms: Option<u64>) -> Self {
        match status {
            401 => HttpError::Unauthorized(body),
            403 => HttpError::Forbidden(body),
            404 => HttpError::NotFound(body),
            429 => HttpError::RateLimited { retry_after_ms },
            400..=499 => HttpError::BadRequest(format!("HTTP {status}: {body}")),
            _ => HttpError::ServerError { status, body },
        }
    }
}

/// Errors about the remote job itself rather than the transport.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Snapshot {snapshot_id} failed: {message}")]
    Failed {
        snapshot_id: SnapshotId,
        message: String,
    },

    #[error("Timeout: job {id} did not complete within {waited:?}")]
    Timeout { id: String, waited: Duration },

    #[error("Trigger returned an empty snapshot id")]
    EmptySnapshotId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_translation() {
        assert!(matches!(
            HttpError::from_status(401, "bad token".into(), None),
            HttpError::Unauthorized(_)
        ));
        assert!(matches!(
            HttpError::from_status(403, String::new(), None),
            HttpError::Forbidden(_)
        ));
        assert!(matches!(
            HttpError::from_status(429, String::new(), Some(1000)),
            HttpError::RateLimited {
                retry_after_ms: Some(1000)
            }
        ));
        assert!(matches!(
            HttpError::from_status(422, String::new(), None),
            HttpError::BadRequest(_)
        ));
        assert!(matches!(
            HttpError::from_status(503, String::new(), None),
            HttpError::ServerError { status: 503, .. }
        ));
    }

    #[test]
    fn test_not_ready_message_mentions_status() {
        let msg = HttpError::DataNotReady { status: 202 }.to_string();
        assert!(msg.to_lowercase().contains("not ready yet"));
        assert!(msg.contains("202"));
    }

    #[test]
    fn test_server_error_message_keeps_body() {
        let msg = HttpError::from_status(500, "Internal Server Error".into(), None).to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("Internal Server Error"));
    }

    #[test]
    fn test_auth_and_retry_classification() {
        let auth: SdkError = HttpError::Unauthorized(String::new()).into();
        assert!(auth.is_auth());
        assert!(!auth.is_retryable());

        let busy: SdkError = HttpError::from_status(502, String::new(), None).into();
        assert!(busy.is_retryable());

        let timeout: SdkError = JobError::Timeout {
            id: "s_1".into(),
            waited: Duration::from_secs(5),
        }
        .into();
        assert!(timeout.is_retryable());
        assert!(!SdkError::Validation("x".into()).is_retryable());
    }
}
