//! Search sub-client: Google, Bing and Yandex through the SERP zone.

use crate::client::BrightDataClient;
use crate::domain::serp::{SearchEngine, SearchOptions};
use crate::domain::settle_batch;
use crate::domain::unlocker::client::{send, Outcome};
use crate::domain::unlocker::wire::UnlockerRequest;
use crate::domain::unlocker::ResponseFormat;
use crate::error::SdkError;
use crate::normalize;
use crate::result::{ResultStatus, SearchResult, Timing};
use futures_util::stream::{self, StreamExt};
use serde_json::Value;

/// Sub-client for search engine queries.
pub struct Search<'a> {
    pub(crate) client: &'a BrightDataClient,
}

impl<'a> Search<'a> {
    pub async fn google(&self, query: &str, options: &SearchOptions) -> Result<SearchResult, SdkError> {
        self.run(SearchEngine::Google, query, options).await
    }

    pub async fn bing(&self, query: &str, options: &SearchOptions) -> Result<SearchResult, SdkError> {
        self.run(SearchEngine::Bing, query, options).await
    }

    pub async fn yandex(&self, query: &str, options: &SearchOptions) -> Result<SearchResult, SdkError> {
        self.run(SearchEngine::Yandex, query, options).await
    }

    /// Run several Google queries concurrently, one result per query in order.
    pub async fn google_many<S: AsRef<str>>(
        &self,
        queries: &[S],
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, SdkError> {
        self.many(SearchEngine::Google, queries, options).await
    }

    pub async fn many<S: AsRef<str>>(
        &self,
        engine: SearchEngine,
        queries: &[S],
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, SdkError> {
        let outcomes = stream::iter(queries.iter())
            .map(|q| self.run(engine, q.as_ref(), options))
            .buffered(self.client.config.max_concurrency)
            .collect::<Vec<_>>()
            .await;

        settle_batch(outcomes, |idx, err| {
            let query = queries[idx].as_ref();
            tracing::warn!(query, engine = engine.as_str(), error = %err, "Search failed");
            failed(engine, query, options, ResultStatus::Error, err.to_string(), Timing::default())
        })
    }

    /// Search with an explicit engine.
    pub async fn run(
        &self,
        engine: SearchEngine,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResult, SdkError> {
        if query.trim().is_empty() {
            return Err(SdkError::Validation("search query must not be empty".into()));
        }
        let zone = options
            .zone
            .clone()
            .filter(|z| !z.is_empty())
            .unwrap_or_else(|| self.client.config.serp_zone.clone());
        let body = UnlockerRequest {
            zone: zone.to_string(),
            url: engine.search_url(query, options),
            format: ResponseFormat::Raw.as_str(),
            method: "GET".to_string(),
            country: None,
            data_format: None,
        };

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

        Ok(match outcome {
            Outcome::Body(page) => parsed(engine, query, options, page, timing),
            Outcome::Timeout(message) => {
                tracing::warn!(query, zone = %zone, "{}", message);
                failed(engine, query, options, ResultStatus::Timeout, message, timing)
            }
            Outcome::Failed(message) => {
                tracing::warn!(query, zone = %zone, "{}", message);
                failed(engine, query, options, ResultStatus::Error, message, timing)
            }
        })
    }
}

fn parsed(
    engine: SearchEngine,
    query: &str,
    options: &SearchOptions,
    page: String,
    timing: Timing,
) -> SearchResult {
    let (entries, raw) = match serde_json::from_str::<Value>(&page) {
        Ok(payload) => (normalize::serp_entries(&payload), payload),
        Err(_) => (Vec::new(), Value::String(page)),
    };
    tracing::debug!(query, engine = engine.as_str(), entries = entries.len(), "Search complete");

    SearchResult {
        success: true,
        status: ResultStatus::Ready,
        search_engine: engine,
        query: options.describe(query),
        entries,
        raw: Some(raw),
        country: options.country.clone(),
        error: None,
        timing,
    }
}

fn failed(
    engine: SearchEngine,
    query: &str,
    options: &SearchOptions,
    status: ResultStatus,
    error: String,
    timing: Timing,
) -> SearchResult {
    SearchResult {
        success: false,
        status,
        search_engine: engine,
        query: options.describe(query),
        entries: Vec::new(),
        raw: None,
        country: options.country.clone(),
        error: Some(error),
        timing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parsed_json_page() {
        let page = json!({"organic": [{"title": "Rust", "link": "https://rust-lang.org", "rank": 1}]}).to_string();
        let result = parsed(
            SearchEngine::Google,
            "rust",
            &SearchOptions::default(),
            page,
            Timing::default(),
        );
        assert!(result.success);
        assert_eq!(result.total_found(), 1);
        assert_eq!(result.query_text(), Some("rust"));
    }

    #[test]
    fn test_parsed_html_page_keeps_raw() {
        let result = parsed(
            SearchEngine::Yandex,
            "rust",
            &SearchOptions::default(),
            "<html>results</html>".into(),
            Timing::default(),
        );
        assert!(result.success);
        assert!(result.entries.is_empty());
        assert_eq!(result.raw, Some(Value::String("<html>results</html>".into())));
    }

    #[test]
    fn test_failed_keeps_query_and_country() {
        let options = SearchOptions::default().country("US");
        let result = failed(
            SearchEngine::Bing,
            "rust",
            &options,
            ResultStatus::Timeout,
            "Timeout: job r_1".into(),
            Timing::default(),
        );
        assert!(!result.success);
        assert_eq!(result.country.as_deref(), Some("US"));
        assert_eq!(result.method().as_str(), "serp");
    }
}
