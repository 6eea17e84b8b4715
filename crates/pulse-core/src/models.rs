//! Domain records shared by the store, the pipeline and the HTTP surface.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, UserId};

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// A weekly editorial theme. `day_of_week` follows the Sunday = 0 convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: Uuid,
    pub user_id: UserId,
    pub title: String,
    pub day_of_week: u8,
    pub is_active: bool,
}

/// A topic as submitted from the settings screen. `id = None` creates a row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicInput {
    pub id: Option<Uuid>,
    pub title: String,
    pub day_of_week: i32,
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub id: Uuid,
    pub user_id: UserId,
    pub topic_id: Option<Uuid>,
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_date: Option<DateTime<Utc>>,
    pub summary_bullets: Vec<String>,
    pub content: Option<String>,
    pub pulse_score: u8,
    pub created_at: DateTime<Utc>,
}

/// Fields written on insert and on an upsert refresh. Identity is
/// `(user_id, url)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInsight {
    pub user_id: UserId,
    pub topic_id: Option<Uuid>,
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_date: Option<DateTime<Utc>>,
    pub summary_bullets: Vec<String>,
    pub content: Option<String>,
    pub pulse_score: u8,
}

impl Insight {
    /// Text handed to the ghostwriter: the first 800 characters of the
    /// article body, or the joined summary bullets when there is no body.
    #[must_use]
    pub fn generation_text(&self) -> String {
        match self.content.as_deref().filter(|c| !c.is_empty()) {
            Some(content) => content.chars().take(800).collect(),
            None => self.summary_bullets.join(" "),
        }
    }
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Ready,
    Published,
    Scheduled,
}

impl PostStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Ready => "ready",
            PostStatus::Published => "published",
            PostStatus::Scheduled => "scheduled",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == PostStatus::Published
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "ready" => Ok(PostStatus::Ready),
            "published" => Ok(PostStatus::Published),
            "scheduled" => Ok(PostStatus::Scheduled),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub id: Uuid,
    pub user_id: UserId,
    pub topic_id: Option<Uuid>,
    pub insight_ids: Vec<Uuid>,
    pub generated_text: String,
    pub edited_text: Option<String>,
    pub status: PostStatus,
    pub linkedin_post_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostDraft {
    /// The user's edit when one exists, otherwise the generated text.
    /// Empty strings count as absent.
    #[must_use]
    pub fn current_text(&self) -> Option<&str> {
        self.edited_text
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| Some(self.generated_text.as_str()).filter(|t| !t.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDraft {
    pub user_id: UserId,
    pub topic_id: Option<Uuid>,
    pub insight_ids: Vec<Uuid>,
    pub generated_text: String,
}

/// Sparse editor save. At least one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DraftUpdate {
    pub edited_text: Option<String>,
    pub status: Option<PostStatus>,
}

impl DraftUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edited_text.is_none() && self.status.is_none()
    }
}

// ---------------------------------------------------------------------------
// Images and analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub id: Uuid,
    pub draft_id: Uuid,
    pub url: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub id: Uuid,
    pub draft_id: Option<Uuid>,
    pub linkedin_post_id: Option<String>,
    pub impressions: i32,
    pub likes: i32,
    pub comments: i32,
    pub shares: i32,
    pub captured_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub sector: Option<String>,
    pub objective: Option<String>,
    pub language: Option<String>,
    pub brand_palette: Option<String>,
    #[serde(skip_serializing)]
    pub linkedin_access_token: Option<String>,
}

impl Profile {
    #[must_use]
    pub fn empty(id: UserId) -> Self {
        Self {
            id,
            full_name: None,
            role: None,
            sector: None,
            objective: None,
            language: None,
            brand_palette: None,
            linkedin_access_token: None,
        }
    }

    /// Context line for the ghostwriter: role, sector and objective joined
    /// with `" | "`.
    #[must_use]
    pub fn generation_context(&self) -> String {
        let parts: Vec<&str> = [&self.role, &self.sector, &self.objective]
            .into_iter()
            .filter_map(|p| p.as_deref().map(str::trim).filter(|p| !p.is_empty()))
            .collect();
        if parts.is_empty() {
            GENERIC_CONTEXT.to_string()
        } else {
            parts.join(" | ")
        }
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.linkedin_access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

pub const GENERIC_CONTEXT: &str = "Professionista generico";

/// Settings-screen profile save. `None` leaves a field untouched, an empty
/// string clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub sector: Option<String>,
    pub objective: Option<String>,
    pub language: Option<String>,
    pub brand_palette: Option<String>,
    pub linkedin_access_token: Option<String>,
}

impl ProfileUpdate {
    /// Applies the update to `profile` in place.
    pub fn apply_to(&self, profile: &mut Profile) {
        fn merge(target: &mut Option<String>, value: Option<&String>) {
            if let Some(v) = value {
                *target = if v.trim().is_empty() {
                    None
                } else {
                    Some(v.clone())
                };
            }
        }
        merge(&mut profile.full_name, self.full_name.as_ref());
        merge(&mut profile.role, self.role.as_ref());
        merge(&mut profile.sector, self.sector.as_ref());
        merge(&mut profile.objective, self.objective.as_ref());
        merge(&mut profile.language, self.language.as_ref());
        merge(&mut profile.brand_palette, self.brand_palette.as_ref());
        merge(
            &mut profile.linkedin_access_token,
            self.linkedin_access_token.as_ref(),
        );
    }
}
