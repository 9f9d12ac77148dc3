//! Batch DTOs

use serde::{Deserialize, Serialize};

use crate::domain::batch::Batch;
use crate::domain::job::Job;

/// Request to submit a new batch of keywords
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatch {
    pub keywords: Vec<String>,
    #[serde(default = "default_seo_enabled")]
    pub seo_enabled: bool,
}

fn default_seo_enabled() -> bool {
    true
}

/// A batch together with its jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDetail {
    pub batch: Batch,
    pub jobs: Vec<Job>,
}
