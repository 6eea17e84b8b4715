//! HTTP client for the Tavily-compatible search API.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::SearchError;
use crate::source::ALLOWED_DOMAINS;
use crate::types::{SearchRequest, SearchResponse, SearchResult};

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const SEARCH_DAYS: u32 = 7;
const SEARCH_MAX_RESULTS: u32 = 5;

/// Client for the news search API.
///
/// A client without an API key is valid: every search returns
/// [`SearchError::MissingApiKey`] and [`TavilyClient::search_or_empty`]
/// yields no results.
pub struct TavilyClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
}

impl TavilyClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: Option<String>, timeout_secs: u64) -> Result<Self, SearchError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`SearchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: Option<String>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pulse/0.1 (insight-search)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SearchError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url,
        })
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Searches the last week of articles from the allow-listed publishers.
    ///
    /// # Errors
    ///
    /// - [`SearchError::MissingApiKey`] when no key is configured.
    /// - [`SearchError::Http`] on network failure or non-2xx status.
    /// - [`SearchError::Deserialize`] if the body does not match the expected shape.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;
        let url = self.endpoint("search")?;

        let request = SearchRequest {
            query,
            days: SEARCH_DAYS,
            include_domains: &ALLOWED_DOMAINS,
            max_results: SEARCH_MAX_RESULTS,
        };

        let response = self
            .client
            .post(url.clone())
            .header("X-API-Key", api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Deserialize {
                context: format!("search(query={query})"),
                source: e,
            })?;
        Ok(parsed.results)
    }

    /// Like [`TavilyClient::search`], but logs failures and returns no results.
    pub async fn search_or_empty(&self, query: &str) -> Vec<SearchResult> {
        match self.search(query).await {
            Ok(results) => results,
            Err(SearchError::MissingApiKey) => {
                tracing::warn!("search API key missing; returning no insights");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "search request failed; returning no insights");
                Vec::new()
            }
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, SearchError> {
        self.base_url
            .join(path)
            .map_err(|e| SearchError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}
