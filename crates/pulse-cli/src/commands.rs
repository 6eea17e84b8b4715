//! Command handlers. Each runs one pipeline flow and prints the result as
//! pretty JSON on stdout.

use pulse_core::{AppConfig, UserId};
use pulse_pipeline::{today_day_of_week, PendingWrite, Pipeline};
use serde::Serialize;
use uuid::Uuid;

pub(crate) fn build_pipeline(config: &AppConfig, pool: sqlx::PgPool) -> anyhow::Result<Pipeline> {
    let capabilities = pulse_pipeline::production_capabilities(config, pool)
        .map_err(|e| anyhow::anyhow!("failed to build pipeline clients: {e}"))?;
    Ok(Pipeline::new(capabilities))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) async fn run_ingest(
    pipeline: &Pipeline,
    user: UserId,
    day: Option<u8>,
) -> anyhow::Result<()> {
    let day = day.unwrap_or_else(today_day_of_week);
    let insights = pipeline.ingest_today(user, day).await;
    if insights.is_empty() {
        eprintln!("no insights for day {day}; check the active topic and search key");
    }
    print_json(&insights)
}

pub(crate) async fn run_generate(
    pipeline: &Pipeline,
    user: UserId,
    insight_ids: &[Uuid],
    day: Option<u8>,
) -> anyhow::Result<()> {
    let day = day.unwrap_or_else(today_day_of_week);
    let draft = pipeline.create_draft(user, insight_ids, day).await?;
    print_json(&draft)
}

pub(crate) async fn run_image(pipeline: &Pipeline, user: UserId, draft: Uuid) -> anyhow::Result<()> {
    let attachment = pipeline.attach_image(user, draft).await?;
    print_json(&attachment)
}

/// Logs a write that could not be recorded and returns the line to show
/// the operator.
fn report_unreconciled(write: &PendingWrite) -> anyhow::Result<String> {
    let rendered = serde_json::to_string(write)?;
    tracing::warn!(
        draft_id = %write.draft_id(),
        write = %rendered,
        "unreconciled post-publish write"
    );
    Ok(format!("unreconciled write, apply manually: {rendered}"))
}

/// Publishes, then gives any queued post-publish writes one immediate retry
/// since the queue does not outlive this process.
pub(crate) async fn run_publish(
    pipeline: &Pipeline,
    user: UserId,
    draft: Uuid,
) -> anyhow::Result<()> {
    let outcome = pipeline.publish(user, draft).await?;
    print_json(&outcome)?;

    if !outcome.reconciled {
        let report = pipeline.reconcile_pending().await;
        if report.requeued > 0 {
            for write in pipeline.reconcile_queue().take_all().await {
                let line = report_unreconciled(&write)?;
                eprintln!("{line}");
            }
            anyhow::bail!(
                "published as {} but {} store write(s) could not be recorded",
                outcome.linkedin_post_id,
                report.requeued
            );
        }
        tracing::info!(applied = report.applied, "post-publish writes recorded on retry");
    }
    Ok(())
}
