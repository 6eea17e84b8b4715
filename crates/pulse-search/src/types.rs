//! Wire types for the Tavily-compatible search API.

use serde::{Deserialize, Serialize};

/// Body of `POST /search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub days: u32,
    pub include_domains: &'a [&'a str],
    pub max_results: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// One hit returned by the search API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub published_date: Option<String>,
}
