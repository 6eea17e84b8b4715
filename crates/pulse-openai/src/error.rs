use thiserror::Error;

/// Errors returned by the OpenAI client.
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("OpenAI API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The model output did not conform to the requested schema, or the
    /// model refused. Never retried.
    #[error("output does not conform to schema: {0}")]
    SchemaViolation(String),

    /// The image response carried no base64 payload.
    #[error("image response is missing b64_json")]
    MissingImage,

    #[error("image payload is not valid base64: {0}")]
    InvalidImage(#[from] base64::DecodeError),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
