//! Research stage
//!
//! Fetches raw findings for the keyword and moves the job to analyzing.

use quill_core::domain::job::Job;

use super::{StageContext, StageError, hard_timeout};

pub async fn run(ctx: &StageContext, job: &Job) -> Result<bool, StageError> {
    let research_raw = hard_timeout(
        "research",
        ctx.config.research_timeout,
        ctx.providers.research.fetch_research(&job.keyword),
    )
    .await?;

    tracing::debug!(
        "Job {}: {} chars of research",
        job.id,
        research_raw.chars().count()
    );

    Ok(ctx.store.complete_research(job.id, job.lease_expires_at, &research_raw).await?)
}
