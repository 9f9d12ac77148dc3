//! Batch-related API endpoints

use crate::OrchestratorClient;
use crate::error::Result;
use quill_core::domain::batch::Batch;
use quill_core::domain::blog::Blog;
use quill_core::dto::batch::{BatchDetail, CreateBatch};
use quill_core::dto::step::{StepRequest, StepResult};
use uuid::Uuid;

impl OrchestratorClient {
    // =============================================================================
    // Batches
    // =============================================================================

    /// Submit a batch of keywords
    pub async fn create_batch(&self, req: CreateBatch) -> Result<Batch> {
        let url = format!("{}/batch", self.base_url);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Get a batch and its jobs
    pub async fn get_batch(&self, batch_id: Uuid) -> Result<BatchDetail> {
        let url = format!("{}/batch/{}", self.base_url, batch_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List the blogs generated for a batch
    pub async fn list_blogs(&self, batch_id: Uuid) -> Result<Vec<Blog>> {
        let url = format!("{}/batch/{}/blogs", self.base_url, batch_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Dispatch
    // =============================================================================

    /// Advance one job of the batch by one stage
    ///
    /// # Arguments
    /// * `batch_id` - The batch UUID
    /// * `seo_enabled` - Overrides the batch's SEO flag for this step when set
    pub async fn advance_step(&self, batch_id: Uuid, seo_enabled: Option<bool>) -> Result<StepResult> {
        let url = format!("{}/batch/{}/step", self.base_url, batch_id);
        let response = self
            .client
            .post(&url)
            .json(&StepRequest { seo_enabled })
            .send()
            .await?;

        tracing::debug!("Step request for batch {} returned {}", batch_id, response.status());

        self.handle_response(response).await
    }
}
