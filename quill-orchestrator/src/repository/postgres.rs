//! Postgres-backed `PipelineStore`
//!
//! Thin composition of the per-entity repositories. Operations touching more
//! than one table run in a single transaction.

use async_trait::async_trait;
use quill_core::domain::batch::{Batch, BatchStatus};
use quill_core::domain::blog::{Blog, NewBlog};
use quill_core::domain::job::{Job, JobStatus};
use quill_core::domain::seo::SeoAnalysis;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    ClaimLease, JobClaim, PipelineStore, StoreError, StoreResult, batch_repository, blog_repository,
    job_repository, seo_analysis_repository,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PipelineStore for PgStore {
    async fn create_batch(&self, keywords: &[String], seo_enabled: bool) -> StoreResult<Batch> {
        let now = chrono::Utc::now();
        let batch = Batch {
            id: Uuid::new_v4(),
            total_count: keywords.len() as i32,
            completed_count: 0,
            failed_count: 0,
            seo_enabled,
            status: BatchStatus::Pending,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };

        let mut tx = self.pool.begin().await?;

        batch_repository::insert(&mut *tx, &batch).await?;

        for (position, keyword) in keywords.iter().enumerate() {
            let job = Job {
                id: Uuid::new_v4(),
                batch_id: batch.id,
                keyword: keyword.clone(),
                status: JobStatus::Pending,
                error_message: None,
                research_raw: None,
                research_analyzed: None,
                seo_analysis: None,
                created_at: now,
                started_at: None,
                completed_at: None,
                lease_expires_at: None,
            };
            job_repository::insert(&mut *tx, &job, position as i32).await?;
        }

        tx.commit().await?;

        Ok(batch)
    }

    async fn get_batch(&self, batch_id: Uuid) -> StoreResult<Option<Batch>> {
        Ok(batch_repository::find_by_id(&self.pool, batch_id).await?)
    }

    async fn list_jobs(&self, batch_id: Uuid) -> StoreResult<Vec<Job>> {
        Ok(job_repository::find_by_batch(&self.pool, batch_id).await?)
    }

    async fn get_job(&self, job_id: Uuid) -> StoreResult<Option<Job>> {
        Ok(job_repository::find_by_id(&self.pool, job_id).await?)
    }

    async fn list_blogs(&self, batch_id: Uuid) -> StoreResult<Vec<Blog>> {
        Ok(blog_repository::find_by_batch(&self.pool, batch_id).await?)
    }

    async fn get_blog_for_job(&self, job_id: Uuid) -> StoreResult<Option<Blog>> {
        Ok(blog_repository::find_by_job(&self.pool, job_id).await?)
    }

    async fn claim_job(&self, claim: JobClaim) -> StoreResult<Option<Job>> {
        Ok(job_repository::claim(
            &self.pool,
            claim.job_id,
            claim.expected,
            claim.claim_as,
            claim.lease_until,
            claim.now,
        )
        .await?)
    }

    async fn complete_research(
        &self,
        job_id: Uuid,
        lease: ClaimLease,
        research_raw: &str,
    ) -> StoreResult<bool> {
        Ok(job_repository::complete_research(&self.pool, job_id, lease, research_raw).await?)
    }

    async fn complete_analysis(
        &self,
        job_id: Uuid,
        lease: ClaimLease,
        research_analyzed: &str,
        seo_analysis: Option<&SeoAnalysis>,
    ) -> StoreResult<bool> {
        let payload = seo_analysis.map(serde_json::to_value).transpose()?;
        Ok(
            job_repository::complete_analysis(&self.pool, job_id, lease, research_analyzed, payload)
                .await?,
        )
    }

    async fn complete_write(
        &self,
        job_id: Uuid,
        lease: ClaimLease,
        blog: &NewBlog,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let Some(batch_id) = job_repository::mark_completed(&mut *tx, job_id, lease).await? else {
            tx.rollback().await?;
            return Ok(false);
        };

        blog_repository::insert(&mut *tx, job_id, blog).await?;
        batch_repository::increment_completed(&mut *tx, batch_id).await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn fail_job(
        &self,
        job_id: Uuid,
        lease: ClaimLease,
        error_message: &str,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let Some(batch_id) =
            job_repository::mark_failed(&mut *tx, job_id, lease, error_message).await?
        else {
            tx.rollback().await?;
            return Ok(false);
        };

        batch_repository::increment_failed(&mut *tx, batch_id).await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn mark_batch_running(&self, batch_id: Uuid) -> StoreResult<()> {
        batch_repository::mark_running(&self.pool, batch_id).await?;
        Ok(())
    }

    async fn finalize_batch(&self, batch_id: Uuid) -> StoreResult<Option<Batch>> {
        if let Some(batch) = batch_repository::finalize(&self.pool, batch_id).await? {
            return Ok(Some(batch));
        }

        let batch = batch_repository::find_by_id(&self.pool, batch_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("batch {}", batch_id)))?;

        Ok(batch.status.is_terminal().then_some(batch))
    }

    async fn get_seo_analysis(&self, keyword: &str) -> StoreResult<Option<SeoAnalysis>> {
        Ok(seo_analysis_repository::find_by_keyword(&self.pool, keyword).await?)
    }

    async fn put_seo_analysis(&self, keyword: &str, analysis: &SeoAnalysis) -> StoreResult<()> {
        seo_analysis_repository::upsert(&self.pool, keyword, analysis).await?;
        Ok(())
    }
}
