//! Daily insight ingestion: search, score, upsert, rank.

use chrono::{Datelike, Local, Utc};
use pulse_core::{Insight, NewInsight, Topic, UserId};
use pulse_search::normalize_results;

use crate::store::StoreError;
use crate::Pipeline;

/// Today's weekday in local time, Sunday = 0.
#[must_use]
pub fn today_day_of_week() -> u8 {
    // num_days_from_sunday is always in 0..=6
    u8::try_from(Local::now().weekday().num_days_from_sunday()).unwrap_or(0)
}

/// Stable sort, highest `pulse_score` first.
pub fn rank_insights(insights: &mut [Insight]) {
    insights.sort_by(|a, b| b.pulse_score.cmp(&a.pulse_score));
}

impl Pipeline {
    /// Ingests insights for the user's active topic on `day_of_week`.
    ///
    /// Never fails: a missing topic, a store error during the topic lookup or
    /// a failed search all yield an empty list.
    pub async fn ingest_today(&self, user: UserId, day_of_week: u8) -> Vec<Insight> {
        match self.store.active_topic(user, day_of_week).await {
            Ok(Some(topic)) => self.ingest_topic(&topic).await,
            Ok(None) => {
                tracing::debug!(user_id = %user, day_of_week, "no active topic for today");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(user_id = %user, day_of_week, error = %e, "topic lookup failed");
                Vec::new()
            }
        }
    }

    /// Searches for `topic`, upserts every candidate and returns the saved
    /// records ranked by score. Candidates whose write fails are skipped.
    pub async fn ingest_topic(&self, topic: &Topic) -> Vec<Insight> {
        let results = self.search.search(&topic.title).await;
        let candidates = normalize_results(topic, results, Utc::now());

        let mut saved = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            match self.upsert_insight(candidate).await {
                Ok(insight) => saved.push(insight),
                Err(e) => {
                    tracing::warn!(url = %candidate.url, error = %e, "skipping insight");
                }
            }
        }

        rank_insights(&mut saved);
        tracing::info!(
            user_id = %topic.user_id,
            topic = %topic.title,
            saved = saved.len(),
            "insights ingested"
        );
        saved
    }

    async fn upsert_insight(&self, candidate: &NewInsight) -> Result<Insight, StoreError> {
        match self
            .store
            .find_insight_by_url(candidate.user_id, &candidate.url)
            .await?
        {
            Some(existing) => self
                .store
                .refresh_insight(existing.id, candidate)
                .await?
                .ok_or(StoreError::NotFound),
            None => self.store.insert_insight(candidate).await,
        }
    }
}
