//! Job domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::seo::SeoAnalysis;

/// One keyword's progress through the pipeline
///
/// Structure shared between orchestrator (persists) and client (displays).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub keyword: String,
    pub status: JobStatus,
    pub error_message: Option<String>,
    pub research_raw: Option<String>,
    pub research_analyzed: Option<String>,
    pub seo_analysis: Option<SeoAnalysis>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Set while an invocation is working on the job
    pub lease_expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Job {
    /// True when an invocation currently holds a live lease on this job
    pub fn is_leased(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.lease_expires_at.is_some_and(|until| until > now)
    }
}

/// Job pipeline status
///
/// Advances strictly along pending → researching → analyzing → writing →
/// completed, or jumps to failed from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Researching,
    Analyzing,
    Writing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// True for the statuses a stage handler is working in
    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            JobStatus::Researching | JobStatus::Analyzing | JobStatus::Writing
        )
    }

    /// The stage that moves a job out of this status
    pub fn next_stage(self) -> Option<Stage> {
        match self {
            JobStatus::Pending | JobStatus::Researching => Some(Stage::Research),
            JobStatus::Analyzing => Some(Stage::Analyze),
            JobStatus::Writing => Some(Stage::Write),
            JobStatus::Completed | JobStatus::Failed => None,
        }
    }

    /// Persisted transition table
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        match (self, next) {
            (Pending, Researching)
            | (Researching, Analyzing)
            | (Analyzing, Writing)
            | (Writing, Completed) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Researching => write!(f, "researching"),
            JobStatus::Analyzing => write!(f, "analyzing"),
            JobStatus::Writing => write!(f, "writing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A phase of the fixed pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Research,
    Analyze,
    Write,
}

impl Stage {
    /// Status a job carries while this stage runs
    pub fn working_status(self) -> JobStatus {
        match self {
            Stage::Research => JobStatus::Researching,
            Stage::Analyze => JobStatus::Analyzing,
            Stage::Write => JobStatus::Writing,
        }
    }

    /// Status a job moves to when this stage succeeds
    pub fn success_status(self) -> JobStatus {
        match self {
            Stage::Research => JobStatus::Analyzing,
            Stage::Analyze => JobStatus::Writing,
            Stage::Write => JobStatus::Completed,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Research => write!(f, "research"),
            Stage::Analyze => write!(f, "analyze"),
            Stage::Write => write!(f, "write"),
        }
    }
}
