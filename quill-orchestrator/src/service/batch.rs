//! Batch Service
//!
//! Business logic for submitting and inspecting batches.

use std::collections::HashSet;

use quill_core::domain::batch::Batch;
use quill_core::domain::blog::Blog;
use quill_core::dto::batch::{BatchDetail, CreateBatch};
use uuid::Uuid;

use crate::repository::{PipelineStore, StoreError};

/// Service error type
#[derive(Debug)]
pub enum BatchError {
    NotFound(Uuid),
    ValidationError(String),
    StoreError(StoreError),
}

impl From<StoreError> for BatchError {
    fn from(err: StoreError) -> Self {
        BatchError::StoreError(err)
    }
}

/// Submit a new batch with one job per distinct keyword
pub async fn create_batch(store: &dyn PipelineStore, req: CreateBatch) -> Result<Batch, BatchError> {
    let keywords = normalize_keywords(&req.keywords);

    if keywords.is_empty() {
        return Err(BatchError::ValidationError(
            "At least one non-empty keyword is required".to_string(),
        ));
    }

    let batch = store.create_batch(&keywords, req.seo_enabled).await?;

    tracing::info!(
        "Batch created: {} with {} keywords (seo: {})",
        batch.id,
        batch.total_count,
        batch.seo_enabled
    );

    Ok(batch)
}

/// Get a batch with its jobs
pub async fn get_batch(store: &dyn PipelineStore, id: Uuid) -> Result<BatchDetail, BatchError> {
    let batch = store.get_batch(id).await?.ok_or(BatchError::NotFound(id))?;
    let jobs = store.list_jobs(id).await?;

    Ok(BatchDetail { batch, jobs })
}

/// List the blogs generated so far for a batch
pub async fn list_blogs(store: &dyn PipelineStore, id: Uuid) -> Result<Vec<Blog>, BatchError> {
    store.get_batch(id).await?.ok_or(BatchError::NotFound(id))?;
    Ok(store.list_blogs(id).await?)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Trim keywords, drop empty ones and keep the first of any duplicates
fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_string()))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::MemoryStore;

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_normalize_keywords() {
        let normalized = normalize_keywords(&keywords(&[" 20代 貯金 ", "", "新NISA", "20代 貯金", "  "]));
        assert_eq!(normalized, keywords(&["20代 貯金", "新NISA"]));
    }

    #[tokio::test]
    async fn test_create_batch_rejects_empty_submission() {
        let store = MemoryStore::new();
        let req = CreateBatch {
            keywords: keywords(&["", "   "]),
            seo_enabled: true,
        };

        let result = create_batch(&store, req).await;
        assert!(matches!(result, Err(BatchError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_batch_creates_pending_jobs() {
        let store = MemoryStore::new();
        let req = CreateBatch {
            keywords: keywords(&["20代 貯金", "新NISA", "20代 貯金"]),
            seo_enabled: false,
        };

        let batch = create_batch(&store, req).await.unwrap();
        let detail = get_batch(&store, batch.id).await.unwrap();

        assert_eq!(detail.batch.total_count, 2);
        assert!(!detail.batch.seo_enabled);
        assert_eq!(detail.jobs.len(), 2);
        assert_eq!(detail.jobs[0].keyword, "20代 貯金");
        assert_eq!(detail.jobs[1].keyword, "新NISA");
    }

    #[tokio::test]
    async fn test_unknown_batch_is_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(get_batch(&store, id).await, Err(BatchError::NotFound(_))));
        assert!(matches!(list_blogs(&store, id).await, Err(BatchError::NotFound(_))));
    }
}
