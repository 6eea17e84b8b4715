use thiserror::Error;

/// Errors returned by the search API client.
#[derive(Debug, Error)]
pub enum SearchError {
    /// No API key is configured; search is disabled.
    #[error("search API key is not configured")]
    MissingApiKey,

    /// Network or TLS failure, or a non-2xx status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The base URL passed to the client could not be parsed.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
