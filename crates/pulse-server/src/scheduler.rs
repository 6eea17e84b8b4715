//! Background job scheduler.
//!
//! Drains the post-publish reconciliation queue on a cron schedule.

use std::sync::Arc;

use pulse_pipeline::Pipeline;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// The returned handle must be kept alive for the lifetime of the process;
/// dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// `reconcile_cron` does not parse, or the scheduler fails to start.
pub async fn build_scheduler(
    pipeline: Arc<Pipeline>,
    reconcile_cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_reconcile_job(&scheduler, pipeline, reconcile_cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_reconcile_job(
    scheduler: &JobScheduler,
    pipeline: Arc<Pipeline>,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pipeline = Arc::clone(&pipeline);

        Box::pin(async move {
            if pipeline.reconcile_queue().is_empty().await {
                return;
            }
            let report = pipeline.reconcile_pending().await;
            if report.requeued > 0 {
                tracing::warn!(
                    requeued = report.requeued,
                    "scheduler: post-publish writes still pending"
                );
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: reconciliation job registered");
    Ok(())
}
