//! Search engine result pages through a SERP zone.

pub mod client;

use crate::config::{DEFAULT_ASYNC_POLL_INTERVAL, DEFAULT_ASYNC_TIMEOUT};
use crate::domain::datasets::PollConfig;
use crate::domain::unlocker::RequestMode;
use crate::shared::ZoneName;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use urlencoding::encode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchEngine {
    Google,
    Bing,
    Yandex,
}

impl SearchEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchEngine::Google => "google",
            SearchEngine::Bing => "bing",
            SearchEngine::Yandex => "yandex",
        }
    }

    /// Search page URL the zone is asked to fetch.
    pub fn search_url(&self, query: &str, options: &SearchOptions) -> String {
        let q = encode(query.trim());
        let lang = encode(&options.language);
        let country = options
            .country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_lowercase);

        match self {
            SearchEngine::Google => {
                let mut url = format!(
                    "https://www.google.com/search?q={q}&num={}&hl={lang}",
                    options.num_results
                );
                if let Some(gl) = country {
                    url.push_str(&format!("&gl={}", encode(&gl)));
                }
                if options.device == Device::Mobile {
                    url.push_str("&brd_mobile=1");
                }
                url.push_str("&brd_json=1");
                url
            }
            SearchEngine::Bing => {
                let mut url = format!(
                    "https://www.bing.com/search?q={q}&count={}&setlang={lang}",
                    options.num_results
                );
                if let Some(cc) = country {
                    url.push_str(&format!("&cc={}", encode(&cc)));
                }
                url
            }
            SearchEngine::Yandex => format!(
                "https://yandex.com/search/?text={q}&numdoc={}&lang={lang}",
                options.num_results
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    #[default]
    Desktop,
    Mobile,
}

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerpEntry {
    pub position: u32,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displayed_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Falls back to the client's SERP zone.
    pub zone: Option<ZoneName>,
    pub num_results: u32,
    pub language: String,
    pub country: Option<String>,
    pub device: Device,
    pub mode: RequestMode,
    pub poll: PollConfig,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            zone: None,
            num_results: 10,
            language: "en".to_string(),
            country: None,
            device: Device::Desktop,
            mode: RequestMode::Sync,
            poll: PollConfig::new(DEFAULT_ASYNC_POLL_INTERVAL, DEFAULT_ASYNC_TIMEOUT),
        }
    }
}

impl SearchOptions {
    pub fn zone(mut self, zone: impl Into<ZoneName>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn num_results(mut self, n: u32) -> Self {
        self.num_results = n;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Query parameters as reported back on the result.
    pub(crate) fn describe(&self, query: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("q".into(), Value::from(query.trim()));
        map.insert("num_results".into(), Value::from(self.num_results));
        map.insert("language".into(), Value::from(self.language.clone()));
        if let Some(country) = &self.country {
            map.insert("country".into(), Value::from(country.clone()));
        }
        if self.device == Device::Mobile {
            map.insert("device".into(), Value::from("mobile"));
        }
        map
    }
}
