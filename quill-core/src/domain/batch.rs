//! Batch domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A set of keywords submitted together
///
/// Counters are only ever incremented by the orchestrator; `completed_count +
/// failed_count` never exceeds `total_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    pub total_count: i32,
    pub completed_count: i32,
    pub failed_count: i32,
    pub seo_enabled: bool,
    pub status: BatchStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Batch {
    /// Number of jobs that reached a terminal state
    pub fn finished_count(&self) -> i32 {
        self.completed_count + self.failed_count
    }

    /// True when every job has reached a terminal state
    pub fn all_jobs_finished(&self) -> bool {
        self.finished_count() >= self.total_count
    }

    /// Status the batch takes once all of its jobs are finished
    pub fn terminal_status(&self) -> BatchStatus {
        if self.completed_count > 0 {
            BatchStatus::Completed
        } else {
            BatchStatus::Failed
        }
    }
}

/// Batch lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl BatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, BatchStatus::Completed | BatchStatus::Failed)
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::Pending => write!(f, "pending"),
            BatchStatus::Running => write!(f, "running"),
            BatchStatus::Completed => write!(f, "completed"),
            BatchStatus::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(total: i32, completed: i32, failed: i32) -> Batch {
        let now = chrono::Utc::now();
        Batch {
            id: Uuid::new_v4(),
            total_count: total,
            completed_count: completed,
            failed_count: failed,
            seo_enabled: true,
            status: BatchStatus::Running,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    #[test]
    fn test_all_jobs_finished() {
        assert!(!batch(3, 1, 1).all_jobs_finished());
        assert!(batch(3, 2, 1).all_jobs_finished());
    }

    #[test]
    fn test_terminal_status_partial_success_is_completed() {
        assert_eq!(batch(3, 1, 2).terminal_status(), BatchStatus::Completed);
    }

    #[test]
    fn test_terminal_status_all_failed() {
        assert_eq!(batch(2, 0, 2).terminal_status(), BatchStatus::Failed);
    }
}
