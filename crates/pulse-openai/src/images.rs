//! Image generation returning decoded PNG bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::client::OpenAiClient;
use crate::error::OpenAiError;
use crate::types::{ImageRequest, ImageResponse};

const IMAGES_PATH: &str = "v1/images/generations";
const IMAGE_SIZE: &str = "1024x1024";

impl OpenAiClient {
    /// Generates one square image for `prompt` and returns its bytes.
    ///
    /// # Errors
    ///
    /// - [`OpenAiError::MissingImage`] if the response has no `b64_json`.
    /// - [`OpenAiError::InvalidImage`] if the payload is not valid base64.
    /// - [`OpenAiError::Api`] / [`OpenAiError::Http`] on transport failures.
    pub async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, OpenAiError> {
        let request = ImageRequest {
            model: &self.image_model,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
            response_format: "b64_json",
        };

        let response: ImageResponse = self.post_json(IMAGES_PATH, &request).await?;
        let payload = response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .filter(|b| !b.is_empty())
            .ok_or(OpenAiError::MissingImage)?;

        Ok(STANDARD.decode(payload.trim())?)
    }
}
