//! Database operations for the `topics` table.

use chrono::{DateTime, Utc};
use pulse_core::{Topic, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `topics` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopicRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// `SMALLINT NOT NULL CHECK (day_of_week BETWEEN 0 AND 6)`.
    pub day_of_week: i16,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TopicRow> for Topic {
    type Error = DbError;

    fn try_from(row: TopicRow) -> Result<Self, Self::Error> {
        let day_of_week = u8::try_from(row.day_of_week).map_err(|_| DbError::InvalidValue {
            column: "topics.day_of_week",
            value: row.day_of_week.to_string(),
        })?;
        Ok(Topic {
            id: row.id,
            user_id: UserId::new(row.user_id),
            title: row.title,
            day_of_week,
            is_active: row.is_active,
        })
    }
}

const TOPIC_COLUMNS: &str = "id, user_id, title, day_of_week, is_active, created_at, updated_at";

/// Return the user's active topic for a weekday (0 = Sunday), if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_active_topic(
    pool: &PgPool,
    user_id: Uuid,
    day_of_week: i16,
) -> Result<Option<TopicRow>, DbError> {
    let row = sqlx::query_as::<_, TopicRow>(&format!(
        "SELECT {TOPIC_COLUMNS} FROM topics \
         WHERE user_id = $1 AND day_of_week = $2 AND is_active = true \
         ORDER BY updated_at DESC \
         LIMIT 1"
    ))
    .bind(user_id)
    .bind(day_of_week)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// List all topics for a user ordered by weekday.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_topics(pool: &PgPool, user_id: Uuid) -> Result<Vec<TopicRow>, DbError> {
    let rows = sqlx::query_as::<_, TopicRow>(&format!(
        "SELECT {TOPIC_COLUMNS} FROM topics \
         WHERE user_id = $1 \
         ORDER BY day_of_week ASC, created_at ASC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Insert or update one topic for a user.
///
/// When the topic is active, every other active topic of the same user on the
/// same weekday is deactivated inside the same transaction. Returns `None`
/// when `id` is set but no such topic exists for the user (nothing is written).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn save_topic(
    pool: &PgPool,
    user_id: Uuid,
    id: Option<Uuid>,
    title: &str,
    day_of_week: i16,
    is_active: bool,
) -> Result<Option<TopicRow>, DbError> {
    let mut tx = pool.begin().await?;

    if is_active {
        sqlx::query(
            "UPDATE topics SET is_active = false, updated_at = NOW() \
             WHERE user_id = $1 AND day_of_week = $2 AND is_active = true \
               AND ($3::UUID IS NULL OR id <> $3)",
        )
        .bind(user_id)
        .bind(day_of_week)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    let row = match id {
        Some(id) => {
            sqlx::query_as::<_, TopicRow>(&format!(
                "UPDATE topics \
                 SET title = $3, day_of_week = $4, is_active = $5, updated_at = NOW() \
                 WHERE id = $1 AND user_id = $2 \
                 RETURNING {TOPIC_COLUMNS}"
            ))
            .bind(id)
            .bind(user_id)
            .bind(title)
            .bind(day_of_week)
            .bind(is_active)
            .fetch_optional(&mut *tx)
            .await?
        }
        None => Some(
            sqlx::query_as::<_, TopicRow>(&format!(
                "INSERT INTO topics (id, user_id, title, day_of_week, is_active) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING {TOPIC_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(title)
            .bind(day_of_week)
            .bind(is_active)
            .fetch_one(&mut *tx)
            .await?,
        ),
    };

    // Dropping the transaction without commit rolls back the deactivation.
    if row.is_some() {
        tx.commit().await?;
    }

    Ok(row)
}
