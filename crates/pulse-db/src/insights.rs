//! Database operations for the `insights` table.

use chrono::{DateTime, Utc};
use pulse_core::{Insight, NewInsight, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `insights` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InsightRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic_id: Option<Uuid>,
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_date: Option<DateTime<Utc>>,
    pub summary_bullets: Vec<String>,
    pub content: Option<String>,
    /// `SMALLINT NOT NULL CHECK (pulse_score BETWEEN 0 AND 99)`.
    pub pulse_score: i16,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<InsightRow> for Insight {
    type Error = DbError;

    fn try_from(row: InsightRow) -> Result<Self, Self::Error> {
        let pulse_score = u8::try_from(row.pulse_score).map_err(|_| DbError::InvalidValue {
            column: "insights.pulse_score",
            value: row.pulse_score.to_string(),
        })?;
        Ok(Insight {
            id: row.id,
            user_id: UserId::new(row.user_id),
            topic_id: row.topic_id,
            title: row.title,
            url: row.url,
            source: row.source,
            published_date: row.published_date,
            summary_bullets: row.summary_bullets,
            content: row.content,
            pulse_score,
            created_at: row.created_at,
        })
    }
}

const INSIGHT_COLUMNS: &str = "id, user_id, topic_id, title, url, source, published_date, \
                               summary_bullets, content, pulse_score, created_at";

/// Look up a user's insight by its canonical URL.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_insight_by_url(
    pool: &PgPool,
    user_id: Uuid,
    url: &str,
) -> Result<Option<InsightRow>, DbError> {
    let row = sqlx::query_as::<_, InsightRow>(&format!(
        "SELECT {INSIGHT_COLUMNS} FROM insights WHERE user_id = $1 AND url = $2"
    ))
    .bind(user_id)
    .bind(url)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Insert a new insight and return the stored row.
///
/// A concurrent insert for the same `(user_id, url)` surfaces as a unique
/// violation.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_insight(pool: &PgPool, insight: &NewInsight) -> Result<InsightRow, DbError> {
    let row = sqlx::query_as::<_, InsightRow>(&format!(
        "INSERT INTO insights \
             (id, user_id, topic_id, title, url, source, published_date, \
              summary_bullets, content, pulse_score) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {INSIGHT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(insight.user_id.as_uuid())
    .bind(insight.topic_id)
    .bind(&insight.title)
    .bind(&insight.url)
    .bind(&insight.source)
    .bind(insight.published_date)
    .bind(&insight.summary_bullets)
    .bind(insight.content.as_deref())
    .bind(i16::from(insight.pulse_score))
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Overwrite the fetched fields of an existing insight, keeping its id and
/// `created_at`. Returns `None` if the row no longer exists for the user.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn refresh_insight(
    pool: &PgPool,
    id: Uuid,
    insight: &NewInsight,
) -> Result<Option<InsightRow>, DbError> {
    let row = sqlx::query_as::<_, InsightRow>(&format!(
        "UPDATE insights SET \
             topic_id = $3, title = $4, url = $5, source = $6, published_date = $7, \
             summary_bullets = $8, content = $9, pulse_score = $10, updated_at = NOW() \
         WHERE id = $1 AND user_id = $2 \
         RETURNING {INSIGHT_COLUMNS}"
    ))
    .bind(id)
    .bind(insight.user_id.as_uuid())
    .bind(insight.topic_id)
    .bind(&insight.title)
    .bind(&insight.url)
    .bind(&insight.source)
    .bind(insight.published_date)
    .bind(&insight.summary_bullets)
    .bind(insight.content.as_deref())
    .bind(i16::from(insight.pulse_score))
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch the given insights, silently dropping ids that belong to another
/// user or do not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_insights_by_ids(
    pool: &PgPool,
    user_id: Uuid,
    ids: &[Uuid],
) -> Result<Vec<InsightRow>, DbError> {
    let rows = sqlx::query_as::<_, InsightRow>(&format!(
        "SELECT {INSIGHT_COLUMNS} FROM insights \
         WHERE user_id = $1 AND id = ANY($2) \
         ORDER BY pulse_score DESC, created_at ASC"
    ))
    .bind(user_id)
    .bind(ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
