//! Service Module
//!
//! Business logic layer for the orchestrator.
//! The dispatcher picks one job per call and hands it to the stage handler
//! for its status; stage handlers combine collaborators with the pure
//! content algorithms and persist through `PipelineStore`.

pub mod analyze;
pub mod batch;
pub mod dispatcher;
pub mod error;
pub mod research;
pub mod write;

#[cfg(test)]
pub(crate) mod testing;

// Re-export for convenience
pub use batch as batch_service;
pub use dispatcher::Dispatcher;
pub use error::StageError;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use quill_content::LinkCatalog;
use quill_core::domain::job::{Job, JobStatus, Stage};

use crate::config::PipelineConfig;
use crate::provider::{ProviderError, Providers};
use crate::repository::{PipelineStore, StoreError};

/// Everything a stage handler needs
pub struct StageContext {
    pub store: Arc<dyn PipelineStore>,
    pub providers: Providers,
    pub config: PipelineConfig,
    pub catalog: LinkCatalog,
}

/// What a stage run did to its job
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// The job moved to `next`
    Advanced { next: JobStatus },
    /// The job was marked failed
    Failed { error: String },
    /// The job left the claimed status before this run could persist
    Superseded,
}

impl StageOutcome {
    /// True when the job reached completed or failed in this run
    pub fn finished_job(&self) -> bool {
        match self {
            StageOutcome::Advanced { next } => next.is_terminal(),
            StageOutcome::Failed { .. } => true,
            StageOutcome::Superseded => false,
        }
    }
}

/// Turn a stage result into a persisted outcome
///
/// `Ok(true)` means the stage applied its transition, `Ok(false)` that the
/// job had already moved on. Errors mark the job failed.
pub(crate) async fn finish(
    ctx: &StageContext,
    job: &Job,
    stage: Stage,
    result: Result<bool, StageError>,
) -> Result<StageOutcome, StoreError> {
    match result {
        Ok(true) => {
            let next = stage.success_status();
            tracing::info!("Job {} ({}): {} done, now {}", job.id, job.keyword, stage, next);
            Ok(StageOutcome::Advanced { next })
        }
        Ok(false) => {
            tracing::warn!(
                "Job {} left {} before the {} stage could persist",
                job.id,
                stage.working_status(),
                stage
            );
            Ok(StageOutcome::Superseded)
        }
        Err(err) => {
            let error = err.to_string();
            tracing::error!("Job {} ({}): {} failed: {}", job.id, job.keyword, stage, error);

            if ctx.store.fail_job(job.id, job.lease_expires_at, &error).await? {
                Ok(StageOutcome::Failed { error })
            } else {
                Ok(StageOutcome::Superseded)
            }
        }
    }
}

/// Run a collaborator call that fails the stage when it exceeds `limit`
pub(crate) async fn hard_timeout<T, F>(
    operation: &'static str,
    limit: Duration,
    call: F,
) -> Result<T, StageError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(StageError::Timeout {
            operation,
            after: limit,
        }),
    }
}

/// Run a collaborator call whose failure or lateness is tolerated
pub(crate) async fn soft_timeout<T, F>(operation: &'static str, limit: Duration, call: F) -> Option<T>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            tracing::warn!("{} failed, continuing without it: {}", operation, err);
            None
        }
        Err(_) => {
            tracing::warn!("{} exceeded {:?}, continuing without it", operation, limit);
            None
        }
    }
}
