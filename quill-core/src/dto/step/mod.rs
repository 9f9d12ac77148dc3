//! Step DTOs
//!
//! Request and response of the "advance one step" operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job::{JobStatus, Stage};

/// Request body for advancing a batch by one step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepRequest {
    /// Overrides the batch's stored SEO flag when present
    #[serde(default)]
    pub seo_enabled: Option<bool>,
}

/// Outcome class of a step invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// A stage ran (or was attempted); call again
    Processing,
    /// The batch has reached a terminal state
    Completed,
    /// Nothing this invocation can advance right now
    NoWork,
}

/// Structured result of one dispatcher invocation
///
/// Failures never surface as errors; they are carried in `error` so that
/// polling callers keep going.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<JobStatus>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    pub fn processing(message: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Processing,
            job_id: None,
            keyword: None,
            step: None,
            next_step: None,
            message: message.into(),
            batch_complete: Some(false),
            error: None,
        }
    }

    pub fn no_work(message: impl Into<String>) -> Self {
        Self {
            status: StepStatus::NoWork,
            batch_complete: Some(false),
            ..Self::processing(message)
        }
    }

    pub fn batch_completed(message: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Completed,
            batch_complete: Some(true),
            ..Self::processing(message)
        }
    }

    pub fn with_job(mut self, job_id: Uuid, keyword: impl Into<String>) -> Self {
        self.job_id = Some(job_id);
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_step(mut self, step: Stage, next_step: JobStatus) -> Self {
        self.step = Some(step);
        self.next_step = Some(next_step);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_batch_complete(&self) -> bool {
        self.batch_complete.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_result_omits_empty_fields() {
        let result = StepResult::no_work("idle");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "no_work");
        assert!(json.get("job_id").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_step_request_defaults() {
        let req: StepRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.seo_enabled, None);
    }
}
