//! Repository Module
//!
//! Data access layer for the orchestrator.
//! Each repository handles database operations for a specific domain entity;
//! `PipelineStore` is the single mutation path the dispatcher and stages use.

pub mod batch;
pub mod blog;
pub mod job;
#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod seo_analysis;

// Re-export for convenience
pub use batch as batch_repository;
pub use blog as blog_repository;
pub use job as job_repository;
pub use postgres::PgStore;
pub use seo_analysis as seo_analysis_repository;

use async_trait::async_trait;
use quill_core::domain::batch::Batch;
use quill_core::domain::blog::{Blog, NewBlog};
use quill_core::domain::job::{Job, JobStatus};
use quill_core::domain::seo::SeoAnalysis;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Compare-and-set request moving a job into a stage's working status
#[derive(Debug, Clone)]
pub struct JobClaim {
    pub job_id: Uuid,
    /// Status the job must still be in
    pub expected: JobStatus,
    /// Working status to store
    pub claim_as: JobStatus,
    pub lease_until: chrono::DateTime<chrono::Utc>,
    pub now: chrono::DateTime<chrono::Utc>,
}

/// Lease stamped by the claim a stage run holds
///
/// Completions and failures carry it back to the store and only apply while
/// the job still holds that exact lease. A run that overran its lease and was
/// re-claimed by another invocation therefore cannot touch the job.
pub type ClaimLease = Option<chrono::DateTime<chrono::Utc>>;

/// Persisted batch, job and blog state
///
/// Every status change is conditional on the status the caller expects, so
/// two invocations racing on one job cannot both apply a transition.
#[async_trait]
pub trait PipelineStore: Send + Sync {
    /// Create a batch with one pending job per keyword
    ///
    /// Keywords must already be trimmed, non-empty and distinct.
    async fn create_batch(&self, keywords: &[String], seo_enabled: bool) -> StoreResult<Batch>;

    async fn get_batch(&self, batch_id: Uuid) -> StoreResult<Option<Batch>>;

    /// Jobs of a batch, oldest first
    async fn list_jobs(&self, batch_id: Uuid) -> StoreResult<Vec<Job>>;

    async fn get_job(&self, job_id: Uuid) -> StoreResult<Option<Job>>;

    async fn list_blogs(&self, batch_id: Uuid) -> StoreResult<Vec<Blog>>;

    async fn get_blog_for_job(&self, job_id: Uuid) -> StoreResult<Option<Blog>>;

    /// Claim a job for one stage run
    ///
    /// Returns `None` if the job left `expected` or someone holds a live lease.
    async fn claim_job(&self, claim: JobClaim) -> StoreResult<Option<Job>>;

    /// Store raw research and move researching → analyzing
    async fn complete_research(
        &self,
        job_id: Uuid,
        lease: ClaimLease,
        research_raw: &str,
    ) -> StoreResult<bool>;

    /// Store the brief and optional SEO payload and move analyzing → writing
    async fn complete_analysis(
        &self,
        job_id: Uuid,
        lease: ClaimLease,
        research_analyzed: &str,
        seo_analysis: Option<&SeoAnalysis>,
    ) -> StoreResult<bool>;

    /// Move writing → completed, insert the blog and count the job, atomically
    ///
    /// Returns false (and changes nothing) if the job was not in writing
    /// under `lease`.
    async fn complete_write(&self, job_id: Uuid, lease: ClaimLease, blog: &NewBlog)
    -> StoreResult<bool>;

    /// Move a non-terminal job to failed and count it
    ///
    /// Returns false (and changes nothing) if the job was already terminal or
    /// no longer holds `lease`.
    async fn fail_job(&self, job_id: Uuid, lease: ClaimLease, error_message: &str)
    -> StoreResult<bool>;

    /// Mark a non-terminal batch as running
    async fn mark_batch_running(&self, batch_id: Uuid) -> StoreResult<()>;

    /// Finalize the batch if all of its jobs are finished
    ///
    /// Returns the batch when it is terminal after the call.
    async fn finalize_batch(&self, batch_id: Uuid) -> StoreResult<Option<Batch>>;

    async fn get_seo_analysis(&self, keyword: &str) -> StoreResult<Option<SeoAnalysis>>;

    /// Store the analysis for a keyword, replacing any previous one
    async fn put_seo_analysis(&self, keyword: &str, analysis: &SeoAnalysis) -> StoreResult<()>;
}
