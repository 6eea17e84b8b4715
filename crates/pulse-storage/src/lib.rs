//! Supabase-compatible object storage client.
//!
//! Objects are uploaded with `x-upsert: true` into a single public bucket and
//! addressed by `{base}/storage/v1/object/public/{bucket}/{key}`.

use std::time::Duration;

use reqwest::{Client, Url};
use thiserror::Error;

pub const DEFAULT_BUCKET: &str = "post_images";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid object key: {0:?}")]
    InvalidKey(String),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

pub struct SupabaseStorage {
    client: Client,
    base_url: Url,
    service_key: String,
    bucket: String,
}

impl SupabaseStorage {
    /// # Errors
    ///
    /// Returns [`StorageError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`StorageError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        service_key: &str,
        bucket: &str,
        timeout_secs: u64,
    ) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pulse/0.1 (image-storage)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| StorageError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: parsed,
            service_key: service_key.to_owned(),
            bucket: bucket.to_owned(),
        })
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Uploads `bytes` under `key`, replacing any existing object.
    ///
    /// # Errors
    ///
    /// - [`StorageError::InvalidKey`] for an empty key or one with `..` segments.
    /// - [`StorageError::Api`] / [`StorageError::Http`] on upstream failures.
    pub async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = self.object_url(&format!("storage/v1/object/{}/{key}", self.bucket), key)?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            tracing::warn!(key, status = status.as_u16(), "object upload rejected");
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    /// Public URL of `key`, or `None` when the key cannot form a valid URL.
    #[must_use]
    pub fn public_url(&self, key: &str) -> Option<String> {
        self.object_url(
            &format!("storage/v1/object/public/{}/{key}", self.bucket),
            key,
        )
        .ok()
        .map(String::from)
    }

    fn object_url(&self, path: &str, key: &str) -> Result<Url, StorageError> {
        if key.is_empty() || key.starts_with('/') || key.split('/').any(|s| s == "..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        self.base_url
            .join(path)
            .map_err(|_| StorageError::InvalidKey(key.to_string()))
    }
}
