//! Request body shared by `/request` and `/unblocker/req`.

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UnlockerRequest {
    pub zone: String,
    pub url: String,
    pub format: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_format: Option<&'static str>,
}
