//! Draft creation from selected insights.

use pulse_core::{Insight, NewDraft, PostDraft, UserId};
use uuid::Uuid;

use crate::capabilities::GenerationError;
use crate::error::PipelineError;
use crate::Pipeline;

pub const MAX_SELECTED_INSIGHTS: usize = 3;

/// Removes duplicate ids, keeping first occurrences in order.
#[must_use]
pub fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

impl Pipeline {
    /// Generates a post from 1 to 3 of the user's insights and stores it as a
    /// new draft attached to today's topic.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] for an empty or oversized selection,
    ///   when none of the ids resolve to the user's insights, or when there
    ///   is no active topic for `day_of_week`.
    /// - [`PipelineError::Upstream`] when generation fails.
    /// - [`PipelineError::Persistence`] when the draft cannot be stored.
    pub async fn create_draft(
        &self,
        user: UserId,
        insight_ids: &[Uuid],
        day_of_week: u8,
    ) -> Result<PostDraft, PipelineError> {
        let ids = dedup_ids(insight_ids);
        if ids.is_empty() {
            return Err(PipelineError::Validation(
                "Nessun insight selezionato".to_string(),
            ));
        }
        if ids.len() > MAX_SELECTED_INSIGHTS {
            return Err(PipelineError::Validation(format!(
                "Seleziona al massimo {MAX_SELECTED_INSIGHTS} insight"
            )));
        }

        let (insights, profile, topic) = tokio::join!(
            self.store.insights_by_ids(user, &ids),
            self.store.get_profile(user),
            self.store.active_topic(user, day_of_week),
        );

        let mut insights = insights.unwrap_or_else(|e| {
            tracing::warn!(user_id = %user, error = %e, "insight lookup failed");
            Vec::new()
        });
        let profile = profile.unwrap_or_else(|e| {
            tracing::warn!(user_id = %user, error = %e, "profile lookup failed");
            None
        });
        let topic = match topic {
            Ok(Some(topic)) => topic,
            Ok(None) => return Err(PipelineError::Validation("Tema non trovato".to_string())),
            Err(e) => {
                tracing::warn!(user_id = %user, error = %e, "topic lookup failed");
                return Err(PipelineError::Validation("Tema non trovato".to_string()));
            }
        };

        // Keep the caller's selection order.
        insights.sort_by_key(|i| ids.iter().position(|id| *id == i.id));
        if insights.is_empty() {
            return Err(PipelineError::Validation(
                "Nessun insight selezionato".to_string(),
            ));
        }

        let texts: Vec<String> = insights.iter().map(Insight::generation_text).collect();
        let context = profile.map_or_else(
            || pulse_core::models::GENERIC_CONTEXT.to_string(),
            |p| p.generation_context(),
        );

        let post = self
            .ghostwriter
            .generate(&texts, &context)
            .await
            .map_err(|e: GenerationError| PipelineError::upstream("generator", e))?;

        let draft = self
            .store
            .insert_draft(&NewDraft {
                user_id: user,
                topic_id: Some(topic.id),
                insight_ids: insights.iter().map(|i| i.id).collect(),
                generated_text: post.assemble(),
            })
            .await?;

        tracing::info!(user_id = %user, draft_id = %draft.id, "draft created");
        Ok(draft)
    }
}
