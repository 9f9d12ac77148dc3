//! Job Repository
//!
//! Handles all database operations related to jobs. Every status change is a
//! conditional update on the expected current status and on the lease the
//! caller's claim stamped, so an invocation that lost its claim can neither
//! move a job backwards nor overwrite the outcome of the one that took over.

use quill_core::domain::job::{Job, JobStatus};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const JOB_COLUMNS: &str = r#"
    id, batch_id, keyword, status, error_message, research_raw,
    research_analyzed, seo_analysis, created_at, started_at, completed_at,
    lease_expires_at
"#;

/// Insert a new job
pub async fn insert<'e, E>(executor: E, job: &Job, position: i32) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO jobs (id, batch_id, position, keyword, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        "#,
    )
    .bind(job.id)
    .bind(job.batch_id)
    .bind(position)
    .bind(&job.keyword)
    .bind(status_to_string(job.status))
    .bind(job.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Find a job by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
    let row = sqlx::query_as::<_, JobRow>(&format!(
        "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Find all jobs of a batch, oldest first
pub async fn find_by_batch(pool: &PgPool, batch_id: Uuid) -> Result<Vec<Job>, sqlx::Error> {
    let rows = sqlx::query_as::<_, JobRow>(&format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM jobs
        WHERE batch_id = $1
        ORDER BY created_at ASC, position ASC
        "#
    ))
    .bind(batch_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Claim a job for one stage run
///
/// Succeeds only if the job is still in `expected` and nobody holds a live
/// lease on it.
pub async fn claim(
    pool: &PgPool,
    id: Uuid,
    expected: JobStatus,
    claim_as: JobStatus,
    lease_until: chrono::DateTime<chrono::Utc>,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Option<Job>, sqlx::Error> {
    let row = sqlx::query_as::<_, JobRow>(&format!(
        r#"
        UPDATE jobs
        SET status = $3,
            lease_expires_at = $4,
            started_at = COALESCE(started_at, $5),
            updated_at = $5
        WHERE id = $1
          AND status = $2
          AND (lease_expires_at IS NULL OR lease_expires_at <= $5)
        RETURNING {JOB_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status_to_string(expected))
    .bind(status_to_string(claim_as))
    .bind(lease_until)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Store raw research and move researching → analyzing
pub async fn complete_research(
    pool: &PgPool,
    id: Uuid,
    lease: Option<chrono::DateTime<chrono::Utc>>,
    research_raw: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET research_raw = $2, status = 'analyzing', lease_expires_at = NULL, updated_at = $3
        WHERE id = $1 AND status = 'researching' AND lease_expires_at IS NOT DISTINCT FROM $4
        "#,
    )
    .bind(id)
    .bind(research_raw)
    .bind(chrono::Utc::now())
    .bind(lease)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Store the brief (and SEO payload) and move analyzing → writing
pub async fn complete_analysis(
    pool: &PgPool,
    id: Uuid,
    lease: Option<chrono::DateTime<chrono::Utc>>,
    research_analyzed: &str,
    seo_analysis: Option<serde_json::Value>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET research_analyzed = $2, seo_analysis = $3, status = 'writing',
            lease_expires_at = NULL, updated_at = $4
        WHERE id = $1 AND status = 'analyzing' AND lease_expires_at IS NOT DISTINCT FROM $5
        "#,
    )
    .bind(id)
    .bind(research_analyzed)
    .bind(seo_analysis)
    .bind(chrono::Utc::now())
    .bind(lease)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Move writing → completed; returns the batch ID when the transition happened
pub async fn mark_completed<'e, E>(
    executor: E,
    id: Uuid,
    lease: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<Option<Uuid>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let now = chrono::Utc::now();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        UPDATE jobs
        SET status = 'completed', completed_at = $2, lease_expires_at = NULL, updated_at = $2
        WHERE id = $1 AND status = 'writing' AND lease_expires_at IS NOT DISTINCT FROM $3
        RETURNING batch_id
        "#,
    )
    .bind(id)
    .bind(now)
    .bind(lease)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|r| r.0))
}

/// Move any non-terminal job to failed; returns the batch ID when the
/// transition happened
pub async fn mark_failed<'e, E>(
    executor: E,
    id: Uuid,
    lease: Option<chrono::DateTime<chrono::Utc>>,
    error_message: &str,
) -> Result<Option<Uuid>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let now = chrono::Utc::now();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        UPDATE jobs
        SET status = 'failed', error_message = $2, completed_at = $3,
            lease_expires_at = NULL, updated_at = $3
        WHERE id = $1
          AND status NOT IN ('completed', 'failed')
          AND lease_expires_at IS NOT DISTINCT FROM $4
        RETURNING batch_id
        "#,
    )
    .bind(id)
    .bind(error_message)
    .bind(now)
    .bind(lease)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|r| r.0))
}

// =============================================================================
// Helper Functions
// =============================================================================

fn status_to_string(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "pending",
        JobStatus::Researching => "researching",
        JobStatus::Analyzing => "analyzing",
        JobStatus::Writing => "writing",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
    }
}

fn string_to_status(s: &str) -> JobStatus {
    match s {
        "pending" => JobStatus::Pending,
        "researching" => JobStatus::Researching,
        "analyzing" => JobStatus::Analyzing,
        "writing" => JobStatus::Writing,
        "completed" => JobStatus::Completed,
        // Unknown values are never dispatched again
        _ => JobStatus::Failed,
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    batch_id: Uuid,
    keyword: String,
    status: String,
    error_message: Option<String>,
    research_raw: Option<String>,
    research_analyzed: Option<String>,
    seo_analysis: Option<serde_json::Value>,
    created_at: chrono::DateTime<chrono::Utc>,
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
    lease_expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        // A payload that no longer decodes is dropped so the job can still be
        // dispatched; the write stage then runs unscored.
        let id = row.id;
        let seo_analysis = row.seo_analysis.and_then(|value| {
            serde_json::from_value(value)
                .map_err(|e| {
                    tracing::warn!(
                        "Job {}: stored SEO analysis is unreadable, ignoring it: {}",
                        id,
                        e
                    )
                })
                .ok()
        });

        Job {
            id,
            batch_id: row.batch_id,
            keyword: row.keyword,
            status: string_to_status(&row.status),
            error_message: row.error_message,
            research_raw: row.research_raw,
            research_analyzed: row.research_analyzed,
            seo_analysis,
            created_at: row.created_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
            lease_expires_at: row.lease_expires_at,
        }
    }
}
