//! Illustration generation for a draft.

use pulse_core::{ImageAsset, UserId};
use serde::Serialize;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::Pipeline;

/// Characters of post text used as the illustration concept.
pub const CONCEPT_CHARS: usize = 240;

const PNG_CONTENT_TYPE: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAttachment {
    pub image_url: String,
    /// `None` when the asset row could not be stored; the URL is still valid.
    pub asset: Option<ImageAsset>,
}

#[must_use]
pub fn image_prompt(concept: &str) -> String {
    format!(
        "Editorial illustration style for a professional LinkedIn post. \
         Concept: {concept} \
         Style: Modern flat vector art, \"Humaaans\" inspired, clean lines, minimal background. \
         Colors: professional, balanced, suitable for business context. \
         No text inside the image. \
         Format: Square (1:1)."
    )
}

/// Object key for a generated image: `{user}/{draft}_{uuid}.png`.
#[must_use]
pub fn image_key(user: UserId, draft_id: Uuid) -> String {
    format!("{user}/{draft_id}_{}.png", Uuid::new_v4())
}

impl Pipeline {
    /// Generates an illustration for the draft, uploads it and records it
    /// as an image asset.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NotFound`] if the draft does not exist for `user`.
    /// - [`PipelineError::NoContent`] if the draft has no text.
    /// - [`PipelineError::Upstream`] if generation, upload or URL resolution
    ///   fails.
    pub async fn attach_image(
        &self,
        user: UserId,
        draft_id: Uuid,
    ) -> Result<ImageAttachment, PipelineError> {
        let draft = self
            .store
            .get_draft(user, draft_id)
            .await?
            .ok_or(PipelineError::NotFound("Bozza non trovata"))?;
        let text = draft.current_text().ok_or(PipelineError::NoContent)?;
        let concept: String = text.chars().take(CONCEPT_CHARS).collect();

        let bytes = self
            .images
            .generate_image(&image_prompt(&concept))
            .await
            .map_err(|e| PipelineError::upstream("image_generator", e))?;

        let key = image_key(user, draft_id);
        self.blobs
            .put(&key, bytes, PNG_CONTENT_TYPE)
            .await
            .map_err(|e| PipelineError::upstream("blob_store", e))?;
        let image_url = self
            .blobs
            .public_url(&key)
            .ok_or_else(|| PipelineError::upstream("blob_store", "public URL unavailable"))?;

        let asset = match self
            .store
            .insert_image_asset(draft_id, &image_url, Some(&concept))
            .await
        {
            Ok(asset) => Some(asset),
            Err(e) => {
                tracing::warn!(draft_id = %draft_id, url = %image_url, error = %e, "image asset not recorded");
                None
            }
        };

        tracing::info!(user_id = %user, draft_id = %draft_id, url = %image_url, "image attached");
        Ok(ImageAttachment { image_url, asset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_concept_and_style() {
        let prompt = image_prompt("Leadership nell'era dell'AI");
        assert!(prompt.contains("Concept: Leadership nell'era dell'AI Style:"));
        assert!(prompt.contains("No text inside the image."));
        assert!(prompt.ends_with("Format: Square (1:1)."));
    }

    #[test]
    fn key_is_scoped_by_user_and_draft() {
        let user = UserId::new(Uuid::new_v4());
        let draft = Uuid::new_v4();
        let key = image_key(user, draft);
        assert!(key.starts_with(&format!("{user}/{draft}_")));
        assert!(key.ends_with(".png"));
        assert_ne!(key, image_key(user, draft));
    }
}
