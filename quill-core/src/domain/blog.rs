//! Blog domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Finished article produced by a completed job
///
/// `word_count` and `internal_links` are always derived from `content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub id: Uuid,
    pub job_id: Uuid,
    pub keyword: String,
    pub title: String,
    pub meta_description: String,
    pub content: String,
    pub word_count: i32,
    pub internal_links: Vec<String>,
    pub seo_score: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Blog fields supplied by the write stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlog {
    pub keyword: String,
    pub title: String,
    pub meta_description: String,
    pub content: String,
    pub word_count: i32,
    pub internal_links: Vec<String>,
    pub seo_score: Option<i32>,
}
