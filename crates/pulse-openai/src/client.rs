//! Shared HTTP plumbing for the OpenAI endpoints.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::OpenAiError;
use crate::retry::retry_with_backoff;
use crate::types::ApiErrorBody;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub(crate) const DEFAULT_CHAT_MODEL: &str = "gpt-4o-2024-08-06";
pub(crate) const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

/// Client for the OpenAI REST API.
///
/// Use [`OpenAiClient::new`] for production or
/// [`OpenAiClient::with_base_url`] to point at a mock server in tests.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: Url,
    pub(crate) chat_model: String,
    pub(crate) image_model: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl OpenAiClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`OpenAiError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, OpenAiError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`OpenAiError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`OpenAiError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, OpenAiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pulse/0.1 (ghostwriter)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| OpenAiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            chat_model: DEFAULT_CHAT_MODEL.to_owned(),
            image_model: DEFAULT_IMAGE_MODEL.to_owned(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }

    /// Overrides the chat and image model names.
    #[must_use]
    pub fn with_models(mut self, chat_model: &str, image_model: &str) -> Self {
        self.chat_model = chat_model.to_owned();
        self.image_model = image_model.to_owned();
        self
    }

    /// Overrides the transient-error retry policy. `max_retries = 0` disables it.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, OpenAiError> {
        self.base_url
            .join(path)
            .map_err(|e| OpenAiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// POSTs `body` as JSON to `path` and decodes the 2xx response.
    ///
    /// Transient failures (connect errors, timeouts, 429 and 5xx) are retried
    /// with back-off.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, OpenAiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.post_once(&url, body)
        })
        .await
    }

    async fn post_once<B, T>(&self, url: &Url, body: &B) -> Result<T, OpenAiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| text.chars().take(200).collect());
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| OpenAiError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }
}
