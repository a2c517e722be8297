//! Network URL constants for the Bright Data API.

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.brightdata.com";

/// Trigger a dataset collection.
pub const TRIGGER_PATH: &str = "/datasets/v3/trigger";

/// Snapshot progress, followed by `/{snapshot_id}`.
pub const PROGRESS_PATH: &str = "/datasets/v3/progress";

/// Snapshot data, followed by `/{snapshot_id}`.
pub const SNAPSHOT_PATH: &str = "/datasets/v3/snapshot";

/// Synchronous Web Unlocker / SERP request.
pub const REQUEST_PATH: &str = "/request";

/// Async Web Unlocker / SERP trigger.
pub const UNBLOCKER_TRIGGER_PATH: &str = "/unblocker/req";

/// Async Web Unlocker / SERP result.
pub const UNBLOCKER_RESULT_PATH: &str = "/unblocker/get_result";

/// Lightweight authenticated endpoint used for connection checks.
pub const ACTIVE_ZONES_PATH: &str = "/zone/get_active_zones";

/// Header carrying the async Web Unlocker response id.
pub const RESPONSE_ID_HEADER: &str = "x-response-id";
