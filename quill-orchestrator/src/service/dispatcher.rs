//! Step Dispatcher
//!
//! Entry point of the pipeline. Each call picks one job of a batch, runs the
//! stage its status calls for, and returns. Callers poll until the batch
//! reports completion.

use std::sync::Arc;

use quill_core::domain::batch::Batch;
use quill_core::domain::job::{Job, JobStatus, Stage};
use quill_core::dto::step::StepResult;
use uuid::Uuid;

use super::{StageContext, StageOutcome, analyze, finish, research, write};
use crate::repository::{JobClaim, StoreError};

/// Dispatcher error type
///
/// Pipeline failures are reported inside `StepResult`; only an unknown batch
/// is an error for the caller.
#[derive(Debug)]
pub enum DispatchError {
    BatchNotFound(Uuid),
}

#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<StageContext>,
}

impl Dispatcher {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    /// Advance one job of the batch by one stage
    ///
    /// `seo_enabled` overrides the batch's stored flag when present.
    pub async fn advance_one_step(
        &self,
        batch_id: Uuid,
        seo_enabled: Option<bool>,
    ) -> Result<StepResult, DispatchError> {
        let batch = match self.ctx.store.get_batch(batch_id).await {
            Ok(Some(batch)) => batch,
            Ok(None) => return Err(DispatchError::BatchNotFound(batch_id)),
            Err(err) => return Ok(soft_failure(batch_id, err)),
        };

        let seo_enabled = seo_enabled.unwrap_or(batch.seo_enabled);

        match self.step(&batch, seo_enabled).await {
            Ok(result) => Ok(result),
            Err(err) => Ok(soft_failure(batch_id, err)),
        }
    }

    async fn step(&self, batch: &Batch, seo_enabled: bool) -> Result<StepResult, StoreError> {
        let store = &self.ctx.store;

        if batch.status.is_terminal() {
            return Ok(StepResult::batch_completed(format!(
                "Batch already {}",
                batch.status
            )));
        }

        let now = chrono::Utc::now();
        let jobs = store.list_jobs(batch.id).await?;

        let Some(job) = select_job(&jobs, now) else {
            return match store.finalize_batch(batch.id).await? {
                Some(finished) => {
                    tracing::info!("Batch {} finished as {}", finished.id, finished.status);
                    Ok(StepResult::batch_completed(completion_message(&finished)))
                }
                None => {
                    tracing::debug!("Batch {}: no job available to this invocation", batch.id);
                    Ok(StepResult::no_work(
                        "No job can be advanced right now; others are in progress",
                    ))
                }
            };
        };

        store.mark_batch_running(batch.id).await?;

        let Some(stage) = job.status.next_stage() else {
            return Ok(StepResult::no_work(format!("Job {} is already {}", job.id, job.status)));
        };

        let lease = chrono::Duration::from_std(self.ctx.config.stage_lease)
            .unwrap_or_else(|_| chrono::Duration::minutes(20));
        let claim = JobClaim {
            job_id: job.id,
            expected: job.status,
            claim_as: stage.working_status(),
            lease_until: now + lease,
            now,
        };

        let Some(claimed) = store.claim_job(claim).await? else {
            tracing::debug!("Job {} was claimed by another invocation", job.id);
            return Ok(StepResult::processing(format!(
                "Job {} is being handled by another invocation",
                job.id
            ))
            .with_job(job.id, &job.keyword));
        };

        tracing::info!(
            "Batch {}: running {} for job {} ({})",
            batch.id,
            stage,
            claimed.id,
            claimed.keyword
        );

        let result = match stage {
            Stage::Research => research::run(&self.ctx, &claimed).await,
            Stage::Analyze => analyze::run(&self.ctx, &claimed, seo_enabled).await,
            Stage::Write => write::run(&self.ctx, &claimed, seo_enabled).await,
        };
        let outcome = finish(&self.ctx, &claimed, stage, result).await?;

        let finished = if outcome.finished_job() {
            store.finalize_batch(batch.id).await?
        } else {
            None
        };

        let result = match (&outcome, &finished) {
            (_, Some(finished)) => StepResult::batch_completed(completion_message(finished)),
            (StageOutcome::Advanced { next }, None) => {
                StepResult::processing(format!("{} complete, job is now {}", stage, next))
            }
            (StageOutcome::Failed { .. }, None) => {
                StepResult::processing(format!("{} failed, job marked failed", stage))
            }
            (StageOutcome::Superseded, None) => {
                StepResult::processing(format!("Job {} moved on during {}", claimed.id, stage))
            }
        };

        let result = result.with_job(claimed.id, &claimed.keyword);
        let result = match outcome {
            StageOutcome::Advanced { next } => result.with_step(stage, next),
            StageOutcome::Failed { error } => result
                .with_step(stage, JobStatus::Failed)
                .with_error(error),
            StageOutcome::Superseded => result,
        };

        Ok(result)
    }
}

/// Pick the job this invocation should advance
///
/// Interrupted jobs (in a working status with no live lease) come first,
/// oldest first, then the oldest pending job. Jobs holding a live lease are
/// being worked on elsewhere and are skipped.
pub fn select_job(jobs: &[Job], now: chrono::DateTime<chrono::Utc>) -> Option<&Job> {
    let resumable = jobs
        .iter()
        .filter(|j| j.status.is_in_progress() && !j.is_leased(now));
    let pending = jobs
        .iter()
        .filter(|j| j.status == JobStatus::Pending && !j.is_leased(now));

    oldest(resumable).or_else(|| oldest(pending))
}

/// First job with the earliest creation time
fn oldest<'a>(jobs: impl Iterator<Item = &'a Job>) -> Option<&'a Job> {
    jobs.min_by_key(|job| job.created_at)
}

fn completion_message(batch: &Batch) -> String {
    format!(
        "Batch {}: {} completed, {} failed of {}",
        batch.status, batch.completed_count, batch.failed_count, batch.total_count
    )
}

fn soft_failure(batch_id: Uuid, err: StoreError) -> StepResult {
    tracing::error!("Step for batch {} failed: {}", batch_id, err);
    StepResult::processing("Step failed, will retry on the next call").with_error(err.to_string())
}
