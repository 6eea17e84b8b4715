//! Database operations for the `image_assets` table.

use chrono::{DateTime, Utc};
use pulse_core::ImageAsset;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImageAssetRow {
    pub id: Uuid,
    pub draft_id: Uuid,
    pub url: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ImageAssetRow> for ImageAsset {
    fn from(row: ImageAssetRow) -> Self {
        ImageAsset {
            id: row.id,
            draft_id: row.draft_id,
            url: row.url,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// Attach an image URL to a draft.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a missing draft).
pub async fn insert_image_asset(
    pool: &PgPool,
    draft_id: Uuid,
    url: &str,
    description: Option<&str>,
) -> Result<ImageAssetRow, DbError> {
    let row = sqlx::query_as::<_, ImageAssetRow>(
        "INSERT INTO image_assets (id, draft_id, url, description) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, draft_id, url, description, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(draft_id)
    .bind(url)
    .bind(description)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// List a draft's images, oldest first. The first row is the primary image.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_image_assets(
    pool: &PgPool,
    draft_id: Uuid,
) -> Result<Vec<ImageAssetRow>, DbError> {
    let rows = sqlx::query_as::<_, ImageAssetRow>(
        "SELECT id, draft_id, url, description, created_at \
         FROM image_assets \
         WHERE draft_id = $1 \
         ORDER BY created_at ASC, id ASC",
    )
    .bind(draft_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
