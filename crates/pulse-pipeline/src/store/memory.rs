//! In-process [`Store`] for tests. Compiled with the `test-support` feature.
//!
//! Mirrors the Postgres semantics that the pipeline relies on (per-user
//! scoping, one active topic per weekday, the conditional publish claim) and
//! adds failure injection plus inspection helpers.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use pulse_core::{
    AnalyticsSnapshot, DraftUpdate, ImageAsset, Insight, NewDraft, NewInsight, PostDraft,
    PostStatus, Profile, Topic, UserId,
};
use uuid::Uuid;

use super::{Store, StoreError, TopicWrite};

#[derive(Default)]
struct State {
    profiles: Vec<Profile>,
    topics: Vec<Topic>,
    insights: Vec<Insight>,
    drafts: Vec<PostDraft>,
    images: Vec<ImageAsset>,
    snapshots: Vec<AnalyticsSnapshot>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    failing: Mutex<HashSet<&'static str>>,
    mutations: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every call of `operation` (the trait method name) fail until
    /// [`MemoryStore::heal`] is called.
    pub fn fail(&self, operation: &'static str) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operation);
    }

    pub fn heal(&self, operation: &'static str) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(operation);
    }

    fn check(&self, operation: &'static str) -> Result<(), StoreError> {
        if self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(operation)
        {
            return Err(StoreError::Unavailable(format!("{operation} failed")));
        }
        Ok(())
    }

    fn mutated(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of successful writes since construction (seeding excluded).
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    // -- seeding -----------------------------------------------------------

    pub fn seed_profile(&self, profile: Profile) {
        let mut state = self.state();
        state.profiles.retain(|p| p.id != profile.id);
        state.profiles.push(profile);
    }

    /// Inserts a topic directly, bypassing the single-active rule.
    pub fn seed_topic(&self, user: UserId, title: &str, day_of_week: u8, is_active: bool) -> Topic {
        let topic = Topic {
            id: Uuid::new_v4(),
            user_id: user,
            title: title.to_string(),
            day_of_week,
            is_active,
        };
        self.state().topics.push(topic.clone());
        topic
    }

    pub fn seed_insight(&self, insight: &NewInsight) -> Insight {
        let stored = materialize_insight(Uuid::new_v4(), insight);
        self.state().insights.push(stored.clone());
        stored
    }

    pub fn seed_draft(&self, draft: PostDraft) {
        self.state().drafts.push(draft);
    }

    pub fn seed_image(&self, draft_id: Uuid, url: &str) -> ImageAsset {
        let asset = ImageAsset {
            id: Uuid::new_v4(),
            draft_id,
            url: url.to_string(),
            description: None,
            created_at: Utc::now(),
        };
        self.state().images.push(asset.clone());
        asset
    }

    // -- inspection --------------------------------------------------------

    #[must_use]
    pub fn insights(&self) -> Vec<Insight> {
        self.state().insights.clone()
    }

    #[must_use]
    pub fn topics(&self) -> Vec<Topic> {
        self.state().topics.clone()
    }

    #[must_use]
    pub fn drafts(&self) -> Vec<PostDraft> {
        self.state().drafts.clone()
    }

    #[must_use]
    pub fn draft(&self, id: Uuid) -> Option<PostDraft> {
        self.state().drafts.iter().find(|d| d.id == id).cloned()
    }

    #[must_use]
    pub fn images(&self) -> Vec<ImageAsset> {
        self.state().images.clone()
    }

    #[must_use]
    pub fn snapshots(&self) -> Vec<AnalyticsSnapshot> {
        self.state().snapshots.clone()
    }
}

fn materialize_insight(id: Uuid, insight: &NewInsight) -> Insight {
    Insight {
        id,
        user_id: insight.user_id,
        topic_id: insight.topic_id,
        title: insight.title.clone(),
        url: insight.url.clone(),
        source: insight.source.clone(),
        published_date: insight.published_date,
        summary_bullets: insight.summary_bullets.clone(),
        content: insight.content.clone(),
        pulse_score: insight.pulse_score,
        created_at: Utc::now(),
    }
}

fn draft_mut<'a>(state: &'a mut State, user: UserId, id: Uuid) -> Option<&'a mut PostDraft> {
    state
        .drafts
        .iter_mut()
        .find(|d| d.id == id && d.user_id == user)
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check("ping")
    }

    async fn get_profile(&self, user: UserId) -> Result<Option<Profile>, StoreError> {
        self.check("get_profile")?;
        Ok(self.state().profiles.iter().find(|p| p.id == user).cloned())
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, StoreError> {
        self.check("upsert_profile")?;
        self.seed_profile(profile.clone());
        self.mutated();
        Ok(profile.clone())
    }

    async fn list_topics(&self, user: UserId) -> Result<Vec<Topic>, StoreError> {
        self.check("list_topics")?;
        let mut topics: Vec<Topic> = self
            .state()
            .topics
            .iter()
            .filter(|t| t.user_id == user)
            .cloned()
            .collect();
        topics.sort_by_key(|t| t.day_of_week);
        Ok(topics)
    }

    async fn active_topic(
        &self,
        user: UserId,
        day_of_week: u8,
    ) -> Result<Option<Topic>, StoreError> {
        self.check("active_topic")?;
        Ok(self
            .state()
            .topics
            .iter()
            .rev()
            .find(|t| t.user_id == user && t.day_of_week == day_of_week && t.is_active)
            .cloned())
    }

    async fn save_topic(
        &self,
        user: UserId,
        write: &TopicWrite,
    ) -> Result<Option<Topic>, StoreError> {
        self.check("save_topic")?;
        let mut state = self.state();

        if let Some(id) = write.id {
            if !state.topics.iter().any(|t| t.id == id && t.user_id == user) {
                return Ok(None);
            }
        }

        if write.is_active {
            for topic in state.topics.iter_mut().filter(|t| {
                t.user_id == user
                    && t.day_of_week == write.day_of_week
                    && t.is_active
                    && Some(t.id) != write.id
            }) {
                topic.is_active = false;
            }
        }

        let saved = match write.id {
            Some(id) => {
                let Some(topic) = state
                    .topics
                    .iter_mut()
                    .find(|t| t.id == id && t.user_id == user)
                else {
                    return Ok(None);
                };
                topic.title.clone_from(&write.title);
                topic.day_of_week = write.day_of_week;
                topic.is_active = write.is_active;
                topic.clone()
            }
            None => {
                let topic = Topic {
                    id: Uuid::new_v4(),
                    user_id: user,
                    title: write.title.clone(),
                    day_of_week: write.day_of_week,
                    is_active: write.is_active,
                };
                state.topics.push(topic.clone());
                topic
            }
        };
        drop(state);
        self.mutated();
        Ok(Some(saved))
    }

    async fn find_insight_by_url(
        &self,
        user: UserId,
        url: &str,
    ) -> Result<Option<Insight>, StoreError> {
        self.check("find_insight_by_url")?;
        Ok(self
            .state()
            .insights
            .iter()
            .find(|i| i.user_id == user && i.url == url)
            .cloned())
    }

    async fn insert_insight(&self, insight: &NewInsight) -> Result<Insight, StoreError> {
        self.check("insert_insight")?;
        let mut state = self.state();
        if state
            .insights
            .iter()
            .any(|i| i.user_id == insight.user_id && i.url == insight.url)
        {
            return Err(StoreError::Unavailable(format!(
                "duplicate insight url {}",
                insight.url
            )));
        }
        let stored = materialize_insight(Uuid::new_v4(), insight);
        state.insights.push(stored.clone());
        drop(state);
        self.mutated();
        Ok(stored)
    }

    async fn refresh_insight(
        &self,
        id: Uuid,
        insight: &NewInsight,
    ) -> Result<Option<Insight>, StoreError> {
        self.check("refresh_insight")?;
        let mut state = self.state();
        let Some(existing) = state
            .insights
            .iter_mut()
            .find(|i| i.id == id && i.user_id == insight.user_id)
        else {
            return Ok(None);
        };
        let created_at = existing.created_at;
        *existing = Insight {
            created_at,
            ..materialize_insight(id, insight)
        };
        let refreshed = existing.clone();
        drop(state);
        self.mutated();
        Ok(Some(refreshed))
    }

    async fn insights_by_ids(
        &self,
        user: UserId,
        ids: &[Uuid],
    ) -> Result<Vec<Insight>, StoreError> {
        self.check("insights_by_ids")?;
        Ok(self
            .state()
            .insights
            .iter()
            .filter(|i| i.user_id == user && ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn insert_draft(&self, draft: &NewDraft) -> Result<PostDraft, StoreError> {
        self.check("insert_draft")?;
        let now = Utc::now();
        let stored = PostDraft {
            id: Uuid::new_v4(),
            user_id: draft.user_id,
            topic_id: draft.topic_id,
            insight_ids: draft.insight_ids.clone(),
            generated_text: draft.generated_text.clone(),
            edited_text: None,
            status: PostStatus::Draft,
            linkedin_post_id: None,
            created_at: now,
            updated_at: now,
        };
        self.state().drafts.push(stored.clone());
        self.mutated();
        Ok(stored)
    }

    async fn get_draft(&self, user: UserId, id: Uuid) -> Result<Option<PostDraft>, StoreError> {
        self.check("get_draft")?;
        Ok(self
            .state()
            .drafts
            .iter()
            .find(|d| d.id == id && d.user_id == user)
            .cloned())
    }

    async fn update_draft(
        &self,
        user: UserId,
        id: Uuid,
        update: &DraftUpdate,
    ) -> Result<Option<PostDraft>, StoreError> {
        self.check("update_draft")?;
        let mut state = self.state();
        let Some(draft) = draft_mut(&mut state, user, id) else {
            return Ok(None);
        };
        if draft.status == PostStatus::Published {
            return Ok(None);
        }
        if let Some(text) = &update.edited_text {
            draft.edited_text = Some(text.clone());
        }
        if let Some(status) = update.status {
            draft.status = status;
        }
        draft.updated_at = Utc::now();
        let updated = draft.clone();
        drop(state);
        self.mutated();
        Ok(Some(updated))
    }

    async fn set_edited_text(
        &self,
        user: UserId,
        id: Uuid,
        text: &str,
    ) -> Result<(), StoreError> {
        self.check("set_edited_text")?;
        let mut state = self.state();
        let draft = draft_mut(&mut state, user, id).ok_or(StoreError::NotFound)?;
        draft.edited_text = Some(text.to_string());
        draft.updated_at = Utc::now();
        drop(state);
        self.mutated();
        Ok(())
    }

    async fn claim_for_publish(
        &self,
        user: UserId,
        id: Uuid,
    ) -> Result<Option<PostStatus>, StoreError> {
        self.check("claim_for_publish")?;
        let mut state = self.state();
        let Some(draft) = draft_mut(&mut state, user, id) else {
            return Ok(None);
        };
        if draft.status == PostStatus::Published {
            return Ok(None);
        }
        let previous = draft.status;
        draft.status = PostStatus::Published;
        draft.updated_at = Utc::now();
        drop(state);
        self.mutated();
        Ok(Some(previous))
    }

    async fn release_publish_claim(
        &self,
        user: UserId,
        id: Uuid,
        previous: PostStatus,
    ) -> Result<(), StoreError> {
        self.check("release_publish_claim")?;
        let mut state = self.state();
        let draft = draft_mut(&mut state, user, id)
            .filter(|d| d.status == PostStatus::Published && d.linkedin_post_id.is_none())
            .ok_or(StoreError::NotFound)?;
        draft.status = previous;
        draft.updated_at = Utc::now();
        drop(state);
        self.mutated();
        Ok(())
    }

    async fn set_linkedin_post_id(
        &self,
        user: UserId,
        id: Uuid,
        linkedin_post_id: &str,
    ) -> Result<(), StoreError> {
        self.check("set_linkedin_post_id")?;
        let mut state = self.state();
        let draft = draft_mut(&mut state, user, id).ok_or(StoreError::NotFound)?;
        draft.status = PostStatus::Published;
        draft.linkedin_post_id = Some(linkedin_post_id.to_string());
        draft.updated_at = Utc::now();
        drop(state);
        self.mutated();
        Ok(())
    }

    async fn insert_image_asset(
        &self,
        draft_id: Uuid,
        url: &str,
        description: Option<&str>,
    ) -> Result<ImageAsset, StoreError> {
        self.check("insert_image_asset")?;
        let asset = ImageAsset {
            id: Uuid::new_v4(),
            draft_id,
            url: url.to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
        };
        self.state().images.push(asset.clone());
        self.mutated();
        Ok(asset)
    }

    async fn list_image_assets(&self, draft_id: Uuid) -> Result<Vec<ImageAsset>, StoreError> {
        self.check("list_image_assets")?;
        Ok(self
            .state()
            .images
            .iter()
            .filter(|a| a.draft_id == draft_id)
            .cloned()
            .collect())
    }

    async fn insert_analytics_snapshot(
        &self,
        draft_id: Uuid,
        linkedin_post_id: &str,
    ) -> Result<AnalyticsSnapshot, StoreError> {
        self.check("insert_analytics_snapshot")?;
        let snapshot = AnalyticsSnapshot {
            id: Uuid::new_v4(),
            draft_id: Some(draft_id),
            linkedin_post_id: Some(linkedin_post_id.to_string()),
            impressions: 0,
            likes: 0,
            comments: 0,
            shares: 0,
            captured_at: Utc::now(),
        };
        self.state().snapshots.push(snapshot.clone());
        self.mutated();
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn injected_failure_lasts_until_healed() {
        let store = MemoryStore::new();
        store.fail("ping");
        assert!(matches!(store.ping().await, Err(StoreError::Unavailable(_))));

        store.heal("ping");
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn seeding_is_not_counted_as_a_mutation() {
        let store = MemoryStore::new();
        let user = UserId::new(Uuid::new_v4());
        store.seed_topic(user, "AI", 1, true);
        assert_eq!(store.mutation_count(), 0);

        store
            .save_topic(
                user,
                &TopicWrite {
                    id: None,
                    title: "Cloud".to_string(),
                    day_of_week: 2,
                    is_active: true,
                },
            )
            .await
            .expect("save");
        assert_eq!(store.mutation_count(), 1);
    }
}
