//! Record store abstraction.
//!
//! Every operation is scoped by the owning user where the record carries one.

#[cfg(any(test, feature = "test-support"))]
mod memory;
mod postgres;

use async_trait::async_trait;
use pulse_core::{
    AnalyticsSnapshot, DraftUpdate, ImageAsset, Insight, NewDraft, NewInsight, PostDraft,
    PostStatus, Profile, Topic, UserId,
};
use pulse_db::DbError;
use thiserror::Error;
use uuid::Uuid;

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("record not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A validated topic write. `id = None` inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicWrite {
    pub id: Option<Uuid>,
    pub title: String,
    pub day_of_week: u8,
    pub is_active: bool,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    // Profiles
    async fn get_profile(&self, user: UserId) -> Result<Option<Profile>, StoreError>;
    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, StoreError>;

    // Topics
    async fn list_topics(&self, user: UserId) -> Result<Vec<Topic>, StoreError>;
    async fn active_topic(&self, user: UserId, day_of_week: u8)
        -> Result<Option<Topic>, StoreError>;
    /// Returns `None` when `write.id` names no topic of this user.
    async fn save_topic(&self, user: UserId, write: &TopicWrite)
        -> Result<Option<Topic>, StoreError>;

    // Insights
    async fn find_insight_by_url(
        &self,
        user: UserId,
        url: &str,
    ) -> Result<Option<Insight>, StoreError>;
    async fn insert_insight(&self, insight: &NewInsight) -> Result<Insight, StoreError>;
    async fn refresh_insight(
        &self,
        id: Uuid,
        insight: &NewInsight,
    ) -> Result<Option<Insight>, StoreError>;
    async fn insights_by_ids(&self, user: UserId, ids: &[Uuid])
        -> Result<Vec<Insight>, StoreError>;

    // Drafts
    async fn insert_draft(&self, draft: &NewDraft) -> Result<PostDraft, StoreError>;
    async fn get_draft(&self, user: UserId, id: Uuid) -> Result<Option<PostDraft>, StoreError>;
    /// Returns `None` when the draft is missing or already published.
    async fn update_draft(
        &self,
        user: UserId,
        id: Uuid,
        update: &DraftUpdate,
    ) -> Result<Option<PostDraft>, StoreError>;
    async fn set_edited_text(&self, user: UserId, id: Uuid, text: &str)
        -> Result<(), StoreError>;
    /// Moves the draft to `published` unless it already is, returning the
    /// previous status. `None` means someone else holds the claim.
    async fn claim_for_publish(
        &self,
        user: UserId,
        id: Uuid,
    ) -> Result<Option<PostStatus>, StoreError>;
    async fn release_publish_claim(
        &self,
        user: UserId,
        id: Uuid,
        previous: PostStatus,
    ) -> Result<(), StoreError>;
    async fn set_linkedin_post_id(
        &self,
        user: UserId,
        id: Uuid,
        linkedin_post_id: &str,
    ) -> Result<(), StoreError>;

    // Images and analytics
    async fn insert_image_asset(
        &self,
        draft_id: Uuid,
        url: &str,
        description: Option<&str>,
    ) -> Result<ImageAsset, StoreError>;
    /// Oldest first.
    async fn list_image_assets(&self, draft_id: Uuid) -> Result<Vec<ImageAsset>, StoreError>;
    async fn insert_analytics_snapshot(
        &self,
        draft_id: Uuid,
        linkedin_post_id: &str,
    ) -> Result<AnalyticsSnapshot, StoreError>;
}
