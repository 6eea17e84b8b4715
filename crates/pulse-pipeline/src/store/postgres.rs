use async_trait::async_trait;
use pulse_core::{
    AnalyticsSnapshot, DraftUpdate, ImageAsset, Insight, NewDraft, NewInsight, PostDraft,
    PostStatus, Profile, Topic, UserId,
};
use pulse_db::DbError;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreError, TopicWrite};

/// [`Store`] backed by the Postgres queries in `pulse-db`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn parse_status(raw: &str) -> Result<PostStatus, StoreError> {
    raw.parse::<PostStatus>().map_err(|_| {
        StoreError::Db(DbError::InvalidValue {
            column: "post_drafts.status",
            value: raw.to_string(),
        })
    })
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        pulse_db::health_check(&self.pool).await?;
        Ok(())
    }

    async fn get_profile(&self, user: UserId) -> Result<Option<Profile>, StoreError> {
        let row = pulse_db::get_profile(&self.pool, user.as_uuid()).await?;
        Ok(row.map(Profile::from))
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, StoreError> {
        let row = pulse_db::upsert_profile(&self.pool, profile).await?;
        Ok(Profile::from(row))
    }

    async fn list_topics(&self, user: UserId) -> Result<Vec<Topic>, StoreError> {
        let rows = pulse_db::list_topics(&self.pool, user.as_uuid()).await?;
        Ok(rows
            .into_iter()
            .map(Topic::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn active_topic(
        &self,
        user: UserId,
        day_of_week: u8,
    ) -> Result<Option<Topic>, StoreError> {
        let row =
            pulse_db::get_active_topic(&self.pool, user.as_uuid(), i16::from(day_of_week)).await?;
        Ok(row.map(Topic::try_from).transpose()?)
    }

    async fn save_topic(
        &self,
        user: UserId,
        write: &TopicWrite,
    ) -> Result<Option<Topic>, StoreError> {
        let row = pulse_db::save_topic(
            &self.pool,
            user.as_uuid(),
            write.id,
            &write.title,
            i16::from(write.day_of_week),
            write.is_active,
        )
        .await?;
        Ok(row.map(Topic::try_from).transpose()?)
    }

    async fn find_insight_by_url(
        &self,
        user: UserId,
        url: &str,
    ) -> Result<Option<Insight>, StoreError> {
        let row = pulse_db::find_insight_by_url(&self.pool, user.as_uuid(), url).await?;
        Ok(row.map(Insight::try_from).transpose()?)
    }

    async fn insert_insight(&self, insight: &NewInsight) -> Result<Insight, StoreError> {
        let row = pulse_db::insert_insight(&self.pool, insight).await?;
        Ok(Insight::try_from(row)?)
    }

    async fn refresh_insight(
        &self,
        id: Uuid,
        insight: &NewInsight,
    ) -> Result<Option<Insight>, StoreError> {
        let row = pulse_db::refresh_insight(&self.pool, id, insight).await?;
        Ok(row.map(Insight::try_from).transpose()?)
    }

    async fn insights_by_ids(
        &self,
        user: UserId,
        ids: &[Uuid],
    ) -> Result<Vec<Insight>, StoreError> {
        let rows = pulse_db::list_insights_by_ids(&self.pool, user.as_uuid(), ids).await?;
        Ok(rows
            .into_iter()
            .map(Insight::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn insert_draft(&self, draft: &NewDraft) -> Result<PostDraft, StoreError> {
        let row = pulse_db::insert_draft(&self.pool, draft).await?;
        Ok(PostDraft::try_from(row)?)
    }

    async fn get_draft(&self, user: UserId, id: Uuid) -> Result<Option<PostDraft>, StoreError> {
        let row = pulse_db::get_draft(&self.pool, user.as_uuid(), id).await?;
        Ok(row.map(PostDraft::try_from).transpose()?)
    }

    async fn update_draft(
        &self,
        user: UserId,
        id: Uuid,
        update: &DraftUpdate,
    ) -> Result<Option<PostDraft>, StoreError> {
        let row = pulse_db::update_draft(
            &self.pool,
            user.as_uuid(),
            id,
            update.edited_text.as_deref(),
            update.status.map(PostStatus::as_str),
        )
        .await?;
        Ok(row.map(PostDraft::try_from).transpose()?)
    }

    async fn set_edited_text(
        &self,
        user: UserId,
        id: Uuid,
        text: &str,
    ) -> Result<(), StoreError> {
        pulse_db::set_draft_edited_text(&self.pool, user.as_uuid(), id, text).await?;
        Ok(())
    }

    async fn claim_for_publish(
        &self,
        user: UserId,
        id: Uuid,
    ) -> Result<Option<PostStatus>, StoreError> {
        let previous = pulse_db::claim_draft_for_publish(&self.pool, user.as_uuid(), id).await?;
        previous.as_deref().map(parse_status).transpose()
    }

    async fn release_publish_claim(
        &self,
        user: UserId,
        id: Uuid,
        previous: PostStatus,
    ) -> Result<(), StoreError> {
        pulse_db::release_publish_claim(&self.pool, user.as_uuid(), id, previous.as_str())
            .await?;
        Ok(())
    }

    async fn set_linkedin_post_id(
        &self,
        user: UserId,
        id: Uuid,
        linkedin_post_id: &str,
    ) -> Result<(), StoreError> {
        pulse_db::set_linkedin_post_id(&self.pool, user.as_uuid(), id, linkedin_post_id).await?;
        Ok(())
    }

    async fn insert_image_asset(
        &self,
        draft_id: Uuid,
        url: &str,
        description: Option<&str>,
    ) -> Result<ImageAsset, StoreError> {
        let row = pulse_db::insert_image_asset(&self.pool, draft_id, url, description).await?;
        Ok(ImageAsset::from(row))
    }

    async fn list_image_assets(&self, draft_id: Uuid) -> Result<Vec<ImageAsset>, StoreError> {
        let rows = pulse_db::list_image_assets(&self.pool, draft_id).await?;
        Ok(rows.into_iter().map(ImageAsset::from).collect())
    }

    async fn insert_analytics_snapshot(
        &self,
        draft_id: Uuid,
        linkedin_post_id: &str,
    ) -> Result<AnalyticsSnapshot, StoreError> {
        let row =
            pulse_db::insert_analytics_snapshot(&self.pool, draft_id, linkedin_post_id).await?;
        Ok(AnalyticsSnapshot::from(row))
    }
}
