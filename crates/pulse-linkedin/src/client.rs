//! HTTP client for the LinkedIn member share API.

use std::time::Duration;

use reqwest::{Client, Response, Url};

use crate::error::LinkedinError;
use crate::types::{UgcPost, UgcPostCreated, UserInfo};

const DEFAULT_BASE_URL: &str = "https://api.linkedin.com";
const RESTLI_PROTOCOL_HEADER: &str = "X-Restli-Protocol-Version";
const RESTLI_PROTOCOL_VERSION: &str = "2.0.0";
const RESTLI_ID_HEADER: &str = "x-restli-id";

/// Client for publishing member posts.
///
/// The access token is per call: each user publishes with their own
/// credential.
pub struct LinkedinClient {
    client: Client,
    base_url: Url,
}

impl LinkedinClient {
    /// # Errors
    ///
    /// Returns [`LinkedinError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64) -> Result<Self, LinkedinError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`LinkedinError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`LinkedinError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, LinkedinError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pulse/0.1 (linkedin-publisher)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| LinkedinError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Publishes `text` (and optionally `image_url`) as the token's owner and
    /// returns the new post id.
    ///
    /// # Errors
    ///
    /// - [`LinkedinError::MissingToken`] for a blank token.
    /// - [`LinkedinError::Api`] / [`LinkedinError::Http`] on upstream failures.
    /// - [`LinkedinError::MissingPostId`] if the API accepted the post without
    ///   returning its id.
    pub async fn publish(
        &self,
        access_token: &str,
        text: &str,
        image_url: Option<&str>,
    ) -> Result<String, LinkedinError> {
        let token = access_token.trim();
        if token.is_empty() {
            return Err(LinkedinError::MissingToken);
        }

        let person = self.userinfo(token).await?;
        let body = UgcPost::new(&person.sub, text, image_url);

        let response = self
            .client
            .post(self.endpoint("v2/ugcPosts")?)
            .bearer_auth(token)
            .header(RESTLI_PROTOCOL_HEADER, RESTLI_PROTOCOL_VERSION)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let header_id = response
            .headers()
            .get(RESTLI_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .filter(|id| !id.is_empty());
        if let Some(id) = header_id {
            return Ok(id);
        }

        let raw = response.text().await?;
        if raw.trim().is_empty() {
            return Err(LinkedinError::MissingPostId);
        }
        let created: UgcPostCreated =
            serde_json::from_str(&raw).map_err(|e| LinkedinError::Deserialize {
                context: "ugcPosts".to_string(),
                source: e,
            })?;
        created
            .id
            .filter(|id| !id.is_empty())
            .ok_or(LinkedinError::MissingPostId)
    }

    async fn userinfo(&self, token: &str) -> Result<UserInfo, LinkedinError> {
        let response = self
            .client
            .get(self.endpoint("v2/userinfo")?)
            .bearer_auth(token)
            .send()
            .await?;
        let response = check_status(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| LinkedinError::Deserialize {
            context: "userinfo".to_string(),
            source: e,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, LinkedinError> {
        self.base_url
            .join(path)
            .map_err(|e| LinkedinError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

async fn check_status(response: Response) -> Result<Response, LinkedinError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect());
    Err(LinkedinError::Api {
        status: status.as_u16(),
        message,
    })
}
