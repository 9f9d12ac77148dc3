//! In-memory `PipelineStore` for tests
//!
//! Mirrors the compare-and-set semantics of the Postgres store. Jobs can be
//! planted in any status to simulate an interrupted invocation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use quill_core::domain::batch::{Batch, BatchStatus};
use quill_core::domain::blog::{Blog, NewBlog};
use quill_core::domain::job::{Job, JobStatus};
use quill_core::domain::seo::SeoAnalysis;
use uuid::Uuid;

use super::{ClaimLease, JobClaim, PipelineStore, StoreError, StoreResult};

#[derive(Default)]
struct MemoryState {
    batches: HashMap<Uuid, Batch>,
    /// Insertion order is job order
    jobs: Vec<Job>,
    blogs: Vec<Blog>,
    seo_analyses: HashMap<String, SeoAnalysis>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a job
    pub fn job(&self, job_id: Uuid) -> Job {
        let state = self.state.lock().unwrap();
        state.jobs.iter().find(|j| j.id == job_id).cloned().unwrap()
    }

    /// Snapshot of a batch
    pub fn batch(&self, batch_id: Uuid) -> Batch {
        self.state.lock().unwrap().batches[&batch_id].clone()
    }

    /// Snapshot of all jobs of a batch
    pub fn jobs(&self, batch_id: Uuid) -> Vec<Job> {
        let state = self.state.lock().unwrap();
        state
            .jobs
            .iter()
            .filter(|j| j.batch_id == batch_id)
            .cloned()
            .collect()
    }

    /// Snapshot of every job in the store
    pub fn all_jobs(&self) -> Vec<Job> {
        self.state.lock().unwrap().jobs.clone()
    }

    /// Overwrite a job, e.g. to leave it mid-stage
    pub fn update_job(&self, job_id: Uuid, update: impl FnOnce(&mut Job)) {
        let mut state = self.state.lock().unwrap();
        let job = state.jobs.iter_mut().find(|j| j.id == job_id).unwrap();
        update(job);
    }

    pub fn blog_count(&self) -> usize {
        self.state.lock().unwrap().blogs.len()
    }
}

#[async_trait]
impl PipelineStore for MemoryStore {
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

        let mut state = self.state.lock().unwrap();
        state.batches.insert(batch.id, batch.clone());
        for keyword in keywords {
            state.jobs.push(Job {
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
            });
        }

        Ok(batch)
    }

    async fn get_batch(&self, batch_id: Uuid) -> StoreResult<Option<Batch>> {
        Ok(self.state.lock().unwrap().batches.get(&batch_id).cloned())
    }

    async fn list_jobs(&self, batch_id: Uuid) -> StoreResult<Vec<Job>> {
        let mut jobs = self.jobs(batch_id);
        jobs.sort_by_key(|j| j.created_at);
        Ok(jobs)
    }

    async fn get_job(&self, job_id: Uuid) -> StoreResult<Option<Job>> {
        let state = self.state.lock().unwrap();
        Ok(state.jobs.iter().find(|j| j.id == job_id).cloned())
    }

    async fn list_blogs(&self, batch_id: Uuid) -> StoreResult<Vec<Blog>> {
        let state = self.state.lock().unwrap();
        let job_ids: Vec<Uuid> = state
            .jobs
            .iter()
            .filter(|j| j.batch_id == batch_id)
            .map(|j| j.id)
            .collect();
        Ok(state
            .blogs
            .iter()
            .filter(|b| job_ids.contains(&b.job_id))
            .cloned()
            .collect())
    }

    async fn get_blog_for_job(&self, job_id: Uuid) -> StoreResult<Option<Blog>> {
        let state = self.state.lock().unwrap();
        Ok(state.blogs.iter().find(|b| b.job_id == job_id).cloned())
    }

    async fn claim_job(&self, claim: JobClaim) -> StoreResult<Option<Job>> {
        let mut state = self.state.lock().unwrap();
        let Some(job) = state.jobs.iter_mut().find(|j| j.id == claim.job_id) else {
            return Ok(None);
        };
        if job.status != claim.expected || job.is_leased(claim.now) {
            return Ok(None);
        }

        job.status = claim.claim_as;
        job.lease_expires_at = Some(claim.lease_until);
        job.started_at.get_or_insert(claim.now);

        Ok(Some(job.clone()))
    }

    async fn complete_research(
        &self,
        job_id: Uuid,
        lease: ClaimLease,
        research_raw: &str,
    ) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(job) = state.jobs.iter_mut().find(|j| {
            j.id == job_id && j.status == JobStatus::Researching && j.lease_expires_at == lease
        })
        else {
            return Ok(false);
        };

        job.research_raw = Some(research_raw.to_string());
        job.status = JobStatus::Analyzing;
        job.lease_expires_at = None;
        Ok(true)
    }

    async fn complete_analysis(
        &self,
        job_id: Uuid,
        lease: ClaimLease,
        research_analyzed: &str,
        seo_analysis: Option<&SeoAnalysis>,
    ) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(job) = state.jobs.iter_mut().find(|j| {
            j.id == job_id && j.status == JobStatus::Analyzing && j.lease_expires_at == lease
        })
        else {
            return Ok(false);
        };

        job.research_analyzed = Some(research_analyzed.to_string());
        job.seo_analysis = seo_analysis.cloned();
        job.status = JobStatus::Writing;
        job.lease_expires_at = None;
        Ok(true)
    }

    async fn complete_write(
        &self,
        job_id: Uuid,
        lease: ClaimLease,
        blog: &NewBlog,
    ) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(job) = state.jobs.iter_mut().find(|j| {
            j.id == job_id && j.status == JobStatus::Writing && j.lease_expires_at == lease
        })
        else {
            return Ok(false);
        };

        let now = chrono::Utc::now();
        job.status = JobStatus::Completed;
        job.completed_at = Some(now);
        job.lease_expires_at = None;
        let batch_id = job.batch_id;

        if !state.blogs.iter().any(|b| b.job_id == job_id) {
            state.blogs.push(Blog {
                id: Uuid::new_v4(),
                job_id,
                keyword: blog.keyword.clone(),
                title: blog.title.clone(),
                meta_description: blog.meta_description.clone(),
                content: blog.content.clone(),
                word_count: blog.word_count,
                internal_links: blog.internal_links.clone(),
                seo_score: blog.seo_score,
                created_at: now,
            });
        }

        let batch = state
            .batches
            .get_mut(&batch_id)
            .ok_or_else(|| StoreError::NotFound(format!("batch {}", batch_id)))?;
        batch.completed_count += 1;
        Ok(true)
    }

    async fn fail_job(
        &self,
        job_id: Uuid,
        lease: ClaimLease,
        error_message: &str,
    ) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(job) = state.jobs.iter_mut().find(|j| {
            j.id == job_id && !j.status.is_terminal() && j.lease_expires_at == lease
        })
        else {
            return Ok(false);
        };

        job.status = JobStatus::Failed;
        job.error_message = Some(error_message.to_string());
        job.completed_at = Some(chrono::Utc::now());
        job.lease_expires_at = None;
        let batch_id = job.batch_id;

        let batch = state
            .batches
            .get_mut(&batch_id)
            .ok_or_else(|| StoreError::NotFound(format!("batch {}", batch_id)))?;
        batch.failed_count += 1;
        Ok(true)
    }

    async fn mark_batch_running(&self, batch_id: Uuid) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(batch) = state.batches.get_mut(&batch_id) {
            if !batch.status.is_terminal() {
                batch.status = BatchStatus::Running;
            }
        }
        Ok(())
    }

    async fn finalize_batch(&self, batch_id: Uuid) -> StoreResult<Option<Batch>> {
        let mut state = self.state.lock().unwrap();
        let batch = state
            .batches
            .get_mut(&batch_id)
            .ok_or_else(|| StoreError::NotFound(format!("batch {}", batch_id)))?;

        if !batch.status.is_terminal() && batch.all_jobs_finished() {
            batch.status = batch.terminal_status();
            batch.completed_at = Some(chrono::Utc::now());
        }

        Ok(batch.status.is_terminal().then(|| batch.clone()))
    }

    async fn get_seo_analysis(&self, keyword: &str) -> StoreResult<Option<SeoAnalysis>> {
        Ok(self.state.lock().unwrap().seo_analyses.get(keyword).cloned())
    }

    async fn put_seo_analysis(&self, keyword: &str, analysis: &SeoAnalysis) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .seo_analyses
            .insert(keyword.to_string(), analysis.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(job: &Job, expected: JobStatus, claim_as: JobStatus) -> JobClaim {
        let now = chrono::Utc::now();
        JobClaim {
            job_id: job.id,
            expected,
            claim_as,
            lease_until: now + chrono::Duration::seconds(60),
            now,
        }
    }

    #[tokio::test]
    async fn test_claim_is_compare_and_set() {
        let store = MemoryStore::new();
        let batch = store.create_batch(&["a".to_string()], true).await.unwrap();
        let job = store.jobs(batch.id).remove(0);

        let first = store
            .claim_job(claim(&job, JobStatus::Pending, JobStatus::Researching))
            .await
            .unwrap();
        let second = store
            .claim_job(claim(&job, JobStatus::Pending, JobStatus::Researching))
            .await
            .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_live_lease_blocks_reclaim() {
        let store = MemoryStore::new();
        let batch = store.create_batch(&["a".to_string()], true).await.unwrap();
        let job = store.jobs(batch.id).remove(0);
        store
            .claim_job(claim(&job, JobStatus::Pending, JobStatus::Researching))
            .await
            .unwrap();

        let reclaim = store
            .claim_job(claim(&job, JobStatus::Researching, JobStatus::Researching))
            .await
            .unwrap();
        assert!(reclaim.is_none());

        store.update_job(job.id, |j| {
            j.lease_expires_at = Some(chrono::Utc::now() - chrono::Duration::seconds(1))
        });
        let reclaim = store
            .claim_job(claim(&job, JobStatus::Researching, JobStatus::Researching))
            .await
            .unwrap();
        assert!(reclaim.is_some());
    }

    #[tokio::test]
    async fn test_expired_claim_loses_its_writes_after_reclaim() {
        let store = MemoryStore::new();
        let batch = store.create_batch(&["a".to_string()], true).await.unwrap();
        let job = store.jobs(batch.id).remove(0);
        store.update_job(job.id, |j| j.status = JobStatus::Writing);

        // A claim whose lease has already run out
        let mut expired = claim(&job, JobStatus::Writing, JobStatus::Writing);
        expired.lease_until = expired.now - chrono::Duration::seconds(1);
        let stale = store.claim_job(expired).await.unwrap().unwrap();
        let stale_lease = stale.lease_expires_at;

        let fresh = store
            .claim_job(claim(&job, JobStatus::Writing, JobStatus::Writing))
            .await
            .unwrap()
            .unwrap();
        let blog = NewBlog {
            keyword: "a".to_string(),
            title: "t".to_string(),
            meta_description: "m".to_string(),
            content: "c".to_string(),
            word_count: 1,
            internal_links: Vec::new(),
            seo_score: None,
        };

        assert!(!store.fail_job(job.id, stale_lease, "late").await.unwrap());
        assert!(!store.complete_write(job.id, stale_lease, &blog).await.unwrap());
        assert_eq!(store.job(job.id).status, JobStatus::Writing);

        assert!(store.complete_write(job.id, fresh.lease_expires_at, &blog).await.unwrap());
        let batch = store.batch(batch.id);
        assert_eq!(batch.completed_count, 1);
        assert_eq!(batch.failed_count, 0);
        assert_eq!(store.blog_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_job_counts_once() {
        let store = MemoryStore::new();
        let batch = store.create_batch(&["a".to_string()], true).await.unwrap();
        let job = store.jobs(batch.id).remove(0);

        assert!(store.fail_job(job.id, None, "boom").await.unwrap());
        assert!(!store.fail_job(job.id, None, "boom again").await.unwrap());

        let batch = store.batch(batch.id);
        assert_eq!(batch.failed_count, 1);
        let job = store.get_job(job.id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error_message.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_complete_write_applies_once() {
        let store = MemoryStore::new();
        let batch = store.create_batch(&["a".to_string()], true).await.unwrap();
        let job = store.jobs(batch.id).remove(0);
        store.update_job(job.id, |j| j.status = JobStatus::Writing);
        let blog = NewBlog {
            keyword: "a".to_string(),
            title: "t".to_string(),
            meta_description: "m".to_string(),
            content: "c".to_string(),
            word_count: 1,
            internal_links: Vec::new(),
            seo_score: None,
        };

        assert!(store.complete_write(job.id, None, &blog).await.unwrap());
        assert!(!store.complete_write(job.id, None, &blog).await.unwrap());

        assert_eq!(store.blog_count(), 1);
        assert_eq!(store.batch(batch.id).completed_count, 1);
    }

    #[tokio::test]
    async fn test_finalize_waits_for_all_jobs() {
        let store = MemoryStore::new();
        let keywords = vec!["a".to_string(), "b".to_string()];
        let batch = store.create_batch(&keywords, true).await.unwrap();
        let jobs = store.jobs(batch.id);

        store.fail_job(jobs[0].id, None, "boom").await.unwrap();
        assert!(store.finalize_batch(batch.id).await.unwrap().is_none());

        store.fail_job(jobs[1].id, None, "boom").await.unwrap();
        let finalized = store.finalize_batch(batch.id).await.unwrap().unwrap();
        assert_eq!(finalized.status, BatchStatus::Failed);
    }
}
