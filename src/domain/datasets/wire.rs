//! Wire types for the dataset endpoints (REST).

use serde::{Deserialize, Serialize};

/// Response of `POST /datasets/v3/trigger`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggerResponse {
    #[serde(default)]
    pub snapshot_id: String,
}

/// Response of `GET /datasets/v3/progress/{snapshot_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressResponse {
    /// Best available explanation for a failed snapshot.
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| match self.errors {
                Some(n) => format!("snapshot failed with {n} errors"),
                None => "snapshot failed".to_string(),
            })
    }
}
