use thiserror::Error;

/// Errors returned by the LinkedIn client.
#[derive(Debug, Error)]
pub enum LinkedinError {
    /// The access token is empty.
    #[error("missing LinkedIn access token")]
    MissingToken,

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("LinkedIn API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The post was accepted but neither the `x-restli-id` header nor the
    /// body carried its id.
    #[error("LinkedIn response did not include a post id")]
    MissingPostId,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
