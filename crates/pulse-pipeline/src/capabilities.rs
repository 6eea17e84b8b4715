//! External capabilities the pipeline depends on, and their production
//! adapters over the HTTP clients.

use async_trait::async_trait;
use pulse_core::PostStructure;
use pulse_linkedin::{DryRunPublisher, LinkedinClient, LinkedinError};
use pulse_openai::{OpenAiClient, OpenAiError};
use pulse_search::{SearchError, SearchResult, TavilyClient};
use pulse_storage::{StorageError, SupabaseStorage};
use thiserror::Error;

/// Opaque failure of an external capability. The message is for logs only.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CapabilityError(pub String);

impl From<OpenAiError> for CapabilityError {
    fn from(err: OpenAiError) -> Self {
        Self(err.to_string())
    }
}

impl From<SearchError> for CapabilityError {
    fn from(err: SearchError) -> Self {
        Self(err.to_string())
    }
}

impl From<StorageError> for CapabilityError {
    fn from(err: StorageError) -> Self {
        Self(err.to_string())
    }
}

impl From<LinkedinError> for CapabilityError {
    fn from(err: LinkedinError) -> Self {
        Self(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Output was unparseable, incomplete or refused. Fatal, never retried.
    #[error("output does not conform to schema: {0}")]
    SchemaViolation(String),

    #[error("generation failed: {0}")]
    Failed(String),
}

impl From<OpenAiError> for GenerationError {
    fn from(err: OpenAiError) -> Self {
        match err {
            OpenAiError::SchemaViolation(reason) => Self::SchemaViolation(reason),
            other => Self::Failed(other.to_string()),
        }
    }
}

/// News search. Fail-soft: any failure yields an empty list.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Vec<SearchResult>;
}

#[async_trait]
pub trait PostGenerator: Send + Sync {
    async fn complete_post(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<PostStructure, GenerationError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns the raw PNG bytes of one square image.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, CapabilityError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<(), CapabilityError>;
    fn public_url(&self, key: &str) -> Option<String>;
}

#[async_trait]
pub trait SocialPublisher: Send + Sync {
    /// Publishes and returns the external post id.
    async fn publish(
        &self,
        access_token: &str,
        text: &str,
        image_url: Option<&str>,
    ) -> Result<String, CapabilityError>;
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        self.search_or_empty(query).await
    }
}

#[async_trait]
impl PostGenerator for OpenAiClient {
    async fn complete_post(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<PostStructure, GenerationError> {
        Ok(OpenAiClient::complete_post(self, system_prompt, user_prompt).await?)
    }
}

#[async_trait]
impl ImageGenerator for OpenAiClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, CapabilityError> {
        Ok(OpenAiClient::generate_image(self, prompt).await?)
    }
}

#[async_trait]
impl BlobStore for SupabaseStorage {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), CapabilityError> {
        Ok(SupabaseStorage::put(self, key, bytes, content_type).await?)
    }

    fn public_url(&self, key: &str) -> Option<String> {
        SupabaseStorage::public_url(self, key)
    }
}

#[async_trait]
impl SocialPublisher for LinkedinClient {
    async fn publish(
        &self,
        access_token: &str,
        text: &str,
        image_url: Option<&str>,
    ) -> Result<String, CapabilityError> {
        Ok(LinkedinClient::publish(self, access_token, text, image_url).await?)
    }
}

#[async_trait]
impl SocialPublisher for DryRunPublisher {
    async fn publish(
        &self,
        access_token: &str,
        text: &str,
        image_url: Option<&str>,
    ) -> Result<String, CapabilityError> {
        Ok(DryRunPublisher::publish(self, access_token, text, image_url)?)
    }
}
