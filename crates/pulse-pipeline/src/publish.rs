//! Publish orchestration and post-publish reconciliation.
//!
//! A draft is claimed with a conditional update before the external call, so
//! concurrent publishes reach the publisher at most once. Writes that fail
//! after a successful external publish are queued and retried by
//! [`Pipeline::reconcile_pending`].

use std::collections::VecDeque;
use std::sync::Arc;

use pulse_core::{PostStatus, UserId};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::store::StoreError;
use crate::Pipeline;

const ALREADY_PUBLISHED: &str = "Post già pubblicato";

/// A store write owed after an external publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingWrite {
    LinkedinPostId {
        user_id: UserId,
        draft_id: Uuid,
        linkedin_post_id: String,
    },
    AnalyticsSnapshot {
        draft_id: Uuid,
        linkedin_post_id: String,
    },
}

impl PendingWrite {
    #[must_use]
    pub fn draft_id(&self) -> Uuid {
        match self {
            Self::LinkedinPostId { draft_id, .. } | Self::AnalyticsSnapshot { draft_id, .. } => {
                *draft_id
            }
        }
    }
}

/// Shared FIFO of [`PendingWrite`]s, drained by the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ReconcileQueue {
    inner: Arc<Mutex<VecDeque<PendingWrite>>>,
}

impl ReconcileQueue {
    pub async fn push(&self, write: PendingWrite) {
        self.inner.lock().await.push_back(write);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Removes and returns every queued write, oldest first.
    pub async fn take_all(&self) -> Vec<PendingWrite> {
        self.inner.lock().await.drain(..).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    pub linkedin_post_id: String,
    /// `false` when some post-publish writes were queued for retry.
    pub reconciled: bool,
    pub pending: Vec<PendingWrite>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub applied: usize,
    pub requeued: usize,
}

impl Pipeline {
    /// Publishes a draft to LinkedIn.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NotFound`] if the draft does not exist for `user`.
    /// - [`PipelineError::Conflict`] if it is already published or another
    ///   publish holds the claim.
    /// - [`PipelineError::Forbidden`] if the user has no access token. Nothing
    ///   is written in that case.
    /// - [`PipelineError::Upstream`] if the publisher fails; the claim is
    ///   released.
    /// - [`PipelineError::Persistence`] for store failures before the
    ///   external call.
    pub async fn publish(
        &self,
        user: UserId,
        draft_id: Uuid,
    ) -> Result<PublishOutcome, PipelineError> {
        let draft = self
            .store
            .get_draft(user, draft_id)
            .await?
            .ok_or(PipelineError::NotFound("Bozza non trovata"))?;
        if draft.status.is_terminal() {
            return Err(PipelineError::Conflict(ALREADY_PUBLISHED));
        }

        let profile = self.store.get_profile(user).await.unwrap_or_else(|e| {
            tracing::warn!(user_id = %user, error = %e, "profile lookup failed");
            None
        });
        let Some(token) = profile
            .as_ref()
            .and_then(|p| p.access_token())
            .map(str::to_string)
        else {
            return Err(PipelineError::Forbidden);
        };

        let previous = self
            .store
            .claim_for_publish(user, draft_id)
            .await?
            .ok_or(PipelineError::Conflict(ALREADY_PUBLISHED))?;

        let text = match draft.edited_text.as_deref().filter(|t| !t.is_empty()) {
            Some(edited) => edited.to_string(),
            None => {
                if let Err(e) = self
                    .store
                    .set_edited_text(user, draft_id, &draft.generated_text)
                    .await
                {
                    self.release_claim(user, draft_id, previous).await;
                    return Err(e.into());
                }
                draft.generated_text.clone()
            }
        };

        let image_url = match self.store.list_image_assets(draft_id).await {
            Ok(assets) => assets.into_iter().next().map(|a| a.url),
            Err(e) => {
                tracing::warn!(draft_id = %draft_id, error = %e, "image lookup failed, publishing text only");
                None
            }
        };

        let linkedin_post_id = match self
            .publisher
            .publish(&token, &text, image_url.as_deref())
            .await
        {
            Ok(id) => id,
            Err(e) => {
                self.release_claim(user, draft_id, previous).await;
                return Err(PipelineError::upstream("publisher", e));
            }
        };

        let mut pending = Vec::new();
        let owed = [
            PendingWrite::LinkedinPostId {
                user_id: user,
                draft_id,
                linkedin_post_id: linkedin_post_id.clone(),
            },
            PendingWrite::AnalyticsSnapshot {
                draft_id,
                linkedin_post_id: linkedin_post_id.clone(),
            },
        ];
        for write in owed {
            if let Err(e) = self.apply(&write).await {
                tracing::error!(
                    draft_id = %draft_id,
                    linkedin_post_id = %linkedin_post_id,
                    error = %e,
                    "post-publish reconciliation: write failed, queued for retry"
                );
                self.reconcile.push(write.clone()).await;
                pending.push(write);
            }
        }

        tracing::info!(
            user_id = %user,
            draft_id = %draft_id,
            linkedin_post_id = %linkedin_post_id,
            reconciled = pending.is_empty(),
            "draft published"
        );
        Ok(PublishOutcome {
            linkedin_post_id,
            reconciled: pending.is_empty(),
            pending,
        })
    }

    /// Retries every queued post-publish write once. Writes that fail again
    /// go back on the queue.
    pub async fn reconcile_pending(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        for write in self.reconcile.take_all().await {
            match self.apply(&write).await {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    tracing::warn!(draft_id = %write.draft_id(), error = %e, "reconciliation retry failed");
                    self.reconcile.push(write).await;
                    report.requeued += 1;
                }
            }
        }
        if report.applied > 0 || report.requeued > 0 {
            tracing::info!(
                applied = report.applied,
                requeued = report.requeued,
                "reconciliation pass finished"
            );
        }
        report
    }

    async fn apply(&self, write: &PendingWrite) -> Result<(), StoreError> {
        match write {
            PendingWrite::LinkedinPostId {
                user_id,
                draft_id,
                linkedin_post_id,
            } => {
                self.store
                    .set_linkedin_post_id(*user_id, *draft_id, linkedin_post_id)
                    .await
            }
            PendingWrite::AnalyticsSnapshot {
                draft_id,
                linkedin_post_id,
            } => self
                .store
                .insert_analytics_snapshot(*draft_id, linkedin_post_id)
                .await
                .map(|_| ()),
        }
    }

    async fn release_claim(&self, user: UserId, draft_id: Uuid, previous: PostStatus) {
        if let Err(e) = self
            .store
            .release_publish_claim(user, draft_id, previous)
            .await
        {
            tracing::error!(draft_id = %draft_id, error = %e, "failed to release publish claim");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_write() -> PendingWrite {
        PendingWrite::AnalyticsSnapshot {
            draft_id: Uuid::new_v4(),
            linkedin_post_id: "urn:li:share:1".into(),
        }
    }

    #[tokio::test]
    async fn queue_drains_in_order() {
        let queue = ReconcileQueue::default();
        let first = snapshot_write();
        let second = snapshot_write();
        queue.push(first.clone()).await;
        queue.push(second.clone()).await;
        assert_eq!(queue.len().await, 2);

        assert_eq!(queue.take_all().await, vec![first, second]);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn cloned_queue_shares_state() {
        let queue = ReconcileQueue::default();
        let handle = queue.clone();
        handle.push(snapshot_write()).await;
        assert_eq!(queue.len().await, 1);
    }

    #[test]
    fn pending_write_serializes_with_kind_tag() {
        let json = serde_json::to_value(snapshot_write()).unwrap();
        assert_eq!(json["kind"], "analytics_snapshot");
        assert_eq!(json["linkedin_post_id"], "urn:li:share:1");
    }
}
