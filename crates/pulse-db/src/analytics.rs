use chrono::{DateTime, Utc};
use pulse_core::AnalyticsSnapshot;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalyticsSnapshotRow {
    pub id: Uuid,
    pub draft_id: Option<Uuid>,
    pub linkedin_post_id: Option<String>,
    pub impressions: i32,
    pub likes: i32,
    pub comments: i32,
    pub shares: i32,
    pub captured_at: DateTime<Utc>,
}

impl From<AnalyticsSnapshotRow> for AnalyticsSnapshot {
    fn from(row: AnalyticsSnapshotRow) -> Self {
        AnalyticsSnapshot {
            id: row.id,
            draft_id: row.draft_id,
            linkedin_post_id: row.linkedin_post_id,
            impressions: row.impressions,
            likes: row.likes,
            comments: row.comments,
            shares: row.shares,
            captured_at: row.captured_at,
        }
    }
}

const SNAPSHOT_COLUMNS: &str =
    "id, draft_id, linkedin_post_id, impressions, likes, comments, shares, captured_at";

/// Record the initial all-zero snapshot for a freshly published post.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_analytics_snapshot(
    pool: &PgPool,
    draft_id: Uuid,
    linkedin_post_id: &str,
) -> Result<AnalyticsSnapshotRow, DbError> {
    let row = sqlx::query_as::<_, AnalyticsSnapshotRow>(&format!(
        "INSERT INTO analytics_snapshots \
             (id, draft_id, linkedin_post_id, impressions, likes, comments, shares) \
         VALUES ($1, $2, $3, 0, 0, 0, 0) \
         RETURNING {SNAPSHOT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(draft_id)
    .bind(linkedin_post_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_analytics_snapshots(
    pool: &PgPool,
    draft_id: Uuid,
) -> Result<Vec<AnalyticsSnapshotRow>, DbError> {
    let rows = sqlx::query_as::<_, AnalyticsSnapshotRow>(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM analytics_snapshots \
         WHERE draft_id = $1 \
         ORDER BY captured_at ASC"
    ))
    .bind(draft_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
