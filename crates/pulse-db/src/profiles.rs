//! Database operations for the `profiles` table.

use pulse_core::{Profile, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `profiles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub sector: Option<String>,
    pub objective: Option<String>,
    pub language: Option<String>,
    pub brand_palette: Option<String>,
    pub linkedin_access_token: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: UserId::new(row.id),
            full_name: row.full_name,
            role: row.role,
            sector: row.sector,
            objective: row.objective,
            language: row.language,
            brand_palette: row.brand_palette,
            linkedin_access_token: row.linkedin_access_token,
        }
    }
}

const PROFILE_COLUMNS: &str = "id, full_name, role, sector, objective, language, brand_palette, \
                               linkedin_access_token";

/// Fetch a user's profile.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_profile(pool: &PgPool, id: Uuid) -> Result<Option<ProfileRow>, DbError> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Write the full profile, creating the row on first save.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_profile(pool: &PgPool, profile: &Profile) -> Result<ProfileRow, DbError> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "INSERT INTO profiles \
             (id, full_name, role, sector, objective, language, brand_palette, \
              linkedin_access_token) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (id) DO UPDATE SET \
             full_name = EXCLUDED.full_name, \
             role = EXCLUDED.role, \
             sector = EXCLUDED.sector, \
             objective = EXCLUDED.objective, \
             language = EXCLUDED.language, \
             brand_palette = EXCLUDED.brand_palette, \
             linkedin_access_token = EXCLUDED.linkedin_access_token, \
             updated_at = NOW() \
         RETURNING {PROFILE_COLUMNS}"
    ))
    .bind(profile.id.as_uuid())
    .bind(profile.full_name.as_deref())
    .bind(profile.role.as_deref())
    .bind(profile.sector.as_deref())
    .bind(profile.objective.as_deref())
    .bind(profile.language.as_deref())
    .bind(profile.brand_palette.as_deref())
    .bind(profile.linkedin_access_token.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(row)
}
