//! Database operations for the `post_drafts` table.
//!
//! `published` is terminal. Every write that could move a draft out of it is
//! guarded by `status <> 'published'` in the statement itself.

use chrono::{DateTime, Utc};
use pulse_core::{NewDraft, PostDraft, PostStatus, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `post_drafts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DraftRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic_id: Option<Uuid>,
    pub insight_ids: Vec<Uuid>,
    pub generated_text: String,
    pub edited_text: Option<String>,
    pub status: String,
    pub linkedin_post_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DraftRow> for PostDraft {
    type Error = DbError;

    fn try_from(row: DraftRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<PostStatus>()
            .map_err(|_| DbError::InvalidValue {
                column: "post_drafts.status",
                value: row.status.clone(),
            })?;
        Ok(PostDraft {
            id: row.id,
            user_id: UserId::new(row.user_id),
            topic_id: row.topic_id,
            insight_ids: row.insight_ids,
            generated_text: row.generated_text,
            edited_text: row.edited_text,
            status,
            linkedin_post_id: row.linkedin_post_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const DRAFT_COLUMNS: &str = "id, user_id, topic_id, insight_ids, generated_text, edited_text, \
                             status, linkedin_post_id, created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a freshly generated draft (`status = 'draft'`, no edit).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_draft(pool: &PgPool, draft: &NewDraft) -> Result<DraftRow, DbError> {
    let row = sqlx::query_as::<_, DraftRow>(&format!(
        "INSERT INTO post_drafts \
             (id, user_id, topic_id, insight_ids, generated_text, edited_text, status) \
         VALUES ($1, $2, $3, $4, $5, NULL, 'draft') \
         RETURNING {DRAFT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(draft.user_id.as_uuid())
    .bind(draft.topic_id)
    .bind(&draft.insight_ids)
    .bind(&draft.generated_text)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Fetch a draft scoped to its owner.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_draft(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<DraftRow>, DbError> {
    let row = sqlx::query_as::<_, DraftRow>(&format!(
        "SELECT {DRAFT_COLUMNS} FROM post_drafts WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Apply an editor save. `None` arguments leave the column untouched.
///
/// Returns `None` when the draft does not exist for the user or is already
/// published.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_draft(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    edited_text: Option<&str>,
    status: Option<&str>,
) -> Result<Option<DraftRow>, DbError> {
    let row = sqlx::query_as::<_, DraftRow>(&format!(
        "UPDATE post_drafts SET \
             edited_text = COALESCE($3, edited_text), \
             status = COALESCE($4, status), \
             updated_at = NOW() \
         WHERE id = $1 AND user_id = $2 AND status <> 'published' \
         RETURNING {DRAFT_COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .bind(edited_text)
    .bind(status)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Persist the final text chosen at publish time.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matched, [`DbError::Sqlx`] on failure.
pub async fn set_draft_edited_text(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    edited_text: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE post_drafts SET edited_text = $3, updated_at = NOW() \
         WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .bind(edited_text)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Atomically move a draft to `published` unless it already is.
///
/// Returns the status the draft had before the claim, or `None` when the
/// draft is missing or was already published (someone else holds the claim).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn claim_draft_for_publish(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<String>, DbError> {
    let previous = sqlx::query_scalar::<_, String>(
        "UPDATE post_drafts d SET status = 'published', updated_at = NOW() \
         FROM ( \
             SELECT id, status FROM post_drafts \
             WHERE id = $1 AND user_id = $2 \
             FOR UPDATE \
         ) prev \
         WHERE d.id = prev.id AND prev.status <> 'published' \
         RETURNING prev.status",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(previous)
}

/// Undo a publish claim after the external publish failed.
///
/// Only applies while no external post id has been recorded.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no claimed row matched, [`DbError::Sqlx`] on failure.
pub async fn release_publish_claim(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    previous_status: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE post_drafts SET status = $3, updated_at = NOW() \
         WHERE id = $1 AND user_id = $2 \
           AND status = 'published' AND linkedin_post_id IS NULL",
    )
    .bind(id)
    .bind(user_id)
    .bind(previous_status)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Record the external post id on a published draft.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matched, [`DbError::Sqlx`] on failure.
pub async fn set_linkedin_post_id(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    linkedin_post_id: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE post_drafts \
         SET status = 'published', linkedin_post_id = $3, updated_at = NOW() \
         WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .bind(linkedin_post_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
