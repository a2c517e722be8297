//! HTTP client layer: `BrightDataHttp` with per-endpoint retry policies.

pub mod client;
pub mod retry;

pub use client::{BrightDataHttp, RawResponse};
pub use retry::{RetryConfig, RetryPolicy};
