//! Topic, profile and draft editor operations.

use pulse_core::{
    DraftUpdate, ImageAsset, PostDraft, PostStatus, Profile, ProfileUpdate, Topic, TopicInput,
    UserId,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::store::TopicWrite;
use crate::Pipeline;

/// A draft together with its image assets, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftView {
    #[serde(flatten)]
    pub draft: PostDraft,
    pub image_assets: Vec<ImageAsset>,
}

fn validate_topic(input: &TopicInput) -> Result<TopicWrite, PipelineError> {
    let day_of_week = u8::try_from(input.day_of_week)
        .ok()
        .filter(|d| *d <= 6)
        .ok_or_else(|| {
            PipelineError::Validation(format!(
                "Giorno della settimana non valido: {}",
                input.day_of_week
            ))
        })?;
    let title = input.title.trim();
    if title.is_empty() {
        return Err(PipelineError::Validation(
            "Il titolo del tema è obbligatorio".to_string(),
        ));
    }
    Ok(TopicWrite {
        id: input.id,
        title: title.to_string(),
        day_of_week,
        is_active: input.is_active,
    })
}

impl Pipeline {
    /// # Errors
    ///
    /// Returns [`PipelineError::Persistence`] if the store fails.
    pub async fn list_topics(&self, user: UserId) -> Result<Vec<Topic>, PipelineError> {
        Ok(self.store.list_topics(user).await?)
    }

    /// Validates every item, then writes them in order and returns the
    /// refreshed list.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] for an out-of-range weekday or a blank
    ///   title; nothing is written.
    /// - [`PipelineError::NotFound`] when an item names an unknown topic.
    pub async fn save_topics(
        &self,
        user: UserId,
        topics: Vec<TopicInput>,
    ) -> Result<Vec<Topic>, PipelineError> {
        let writes = topics
            .iter()
            .map(validate_topic)
            .collect::<Result<Vec<_>, _>>()?;

        for write in &writes {
            if self.store.save_topic(user, write).await?.is_none() {
                return Err(PipelineError::NotFound("Tema non trovato"));
            }
        }
        tracing::info!(user_id = %user, count = writes.len(), "topics saved");

        self.list_topics(user).await
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::Persistence`] if the store fails.
    pub async fn get_profile(&self, user: UserId) -> Result<Option<Profile>, PipelineError> {
        Ok(self.store.get_profile(user).await?)
    }

    /// Merges `update` into the stored profile, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Persistence`] if the store fails.
    pub async fn save_profile(
        &self,
        user: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, PipelineError> {
        let mut profile = self
            .store
            .get_profile(user)
            .await?
            .unwrap_or_else(|| Profile::empty(user));
        update.apply_to(&mut profile);
        Ok(self.store.upsert_profile(&profile).await?)
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] if the draft does not exist for
    /// `user`.
    pub async fn get_draft(&self, user: UserId, id: Uuid) -> Result<DraftView, PipelineError> {
        let draft = self
            .store
            .get_draft(user, id)
            .await?
            .ok_or(PipelineError::NotFound("Bozza non trovata"))?;
        self.draft_view(draft).await
    }

    /// Applies an editor save.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] for an empty update or an attempt to
    ///   set `published`.
    /// - [`PipelineError::NotFound`] if the draft does not exist for `user`.
    /// - [`PipelineError::Conflict`] if the draft is already published.
    pub async fn save_draft(
        &self,
        user: UserId,
        id: Uuid,
        update: &DraftUpdate,
    ) -> Result<DraftView, PipelineError> {
        if update.is_empty() {
            return Err(PipelineError::Validation(
                "Nessun campo da aggiornare".to_string(),
            ));
        }
        if update.status == Some(PostStatus::Published) {
            return Err(PipelineError::Validation(
                "Usa la pubblicazione per pubblicare una bozza".to_string(),
            ));
        }

        let current = self
            .store
            .get_draft(user, id)
            .await?
            .ok_or(PipelineError::NotFound("Bozza non trovata"))?;
        if current.status.is_terminal() {
            return Err(PipelineError::Conflict("Bozza già pubblicata"));
        }

        // None here means a publish claimed the draft since the read above.
        let draft = self
            .store
            .update_draft(user, id, update)
            .await?
            .ok_or(PipelineError::Conflict("Bozza già pubblicata"))?;
        self.draft_view(draft).await
    }

    async fn draft_view(&self, draft: PostDraft) -> Result<DraftView, PipelineError> {
        let image_assets = self.store.list_image_assets(draft.id).await?;
        Ok(DraftView {
            draft,
            image_assets,
        })
    }
}
