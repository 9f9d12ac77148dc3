//! Batch Repository
//!
//! Handles all database operations related to batches. Counters are only
//! ever changed with in-place increments.

use quill_core::domain::batch::{Batch, BatchStatus};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const BATCH_COLUMNS: &str = r#"
    id, total_count, completed_count, failed_count, seo_enabled, status,
    created_at, updated_at, completed_at
"#;

/// Insert a new batch
pub async fn insert<'e, E>(executor: E, batch: &Batch) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO batches (
            id, total_count, completed_count, failed_count, seo_enabled, status,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(batch.id)
    .bind(batch.total_count)
    .bind(batch.completed_count)
    .bind(batch.failed_count)
    .bind(batch.seo_enabled)
    .bind(status_to_string(batch.status))
    .bind(batch.created_at)
    .bind(batch.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Find a batch by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Batch>, sqlx::Error> {
    let row = sqlx::query_as::<_, BatchRow>(&format!(
        "SELECT {BATCH_COLUMNS} FROM batches WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Mark a batch as running unless it already reached a terminal state
pub async fn mark_running(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE batches
        SET status = 'running', updated_at = $2
        WHERE id = $1 AND status IN ('pending', 'running')
        "#,
    )
    .bind(id)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Atomically increment the completed counter
pub async fn increment_completed<'e, E>(executor: E, id: Uuid) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE batches
        SET completed_count = completed_count + 1, updated_at = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(chrono::Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}

/// Atomically increment the failed counter
pub async fn increment_failed<'e, E>(executor: E, id: Uuid) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE batches
        SET failed_count = failed_count + 1, updated_at = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(chrono::Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}

/// Move a batch to its terminal status if every job has finished
///
/// Returns the batch only when this call performed the transition.
pub async fn finalize(pool: &PgPool, id: Uuid) -> Result<Option<Batch>, sqlx::Error> {
    let now = chrono::Utc::now();

    let row = sqlx::query_as::<_, BatchRow>(&format!(
        r#"
        UPDATE batches
        SET status = CASE WHEN completed_count > 0 THEN 'completed' ELSE 'failed' END,
            completed_at = $2,
            updated_at = $2
        WHERE id = $1
          AND completed_count + failed_count >= total_count
          AND status NOT IN ('completed', 'failed')
        RETURNING {BATCH_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

// =============================================================================
// Helper Functions
// =============================================================================

fn status_to_string(status: BatchStatus) -> &'static str {
    match status {
        BatchStatus::Pending => "pending",
        BatchStatus::Running => "running",
        BatchStatus::Completed => "completed",
        BatchStatus::Failed => "failed",
    }
}

fn string_to_status(s: &str) -> BatchStatus {
    match s {
        "pending" => BatchStatus::Pending,
        "running" => BatchStatus::Running,
        "completed" => BatchStatus::Completed,
        "failed" => BatchStatus::Failed,
        _ => BatchStatus::Pending,
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct BatchRow {
    id: Uuid,
    total_count: i32,
    completed_count: i32,
    failed_count: i32,
    seo_enabled: bool,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<BatchRow> for Batch {
    fn from(row: BatchRow) -> Self {
        Batch {
            id: row.id,
            total_count: row.total_count,
            completed_count: row.completed_count,
            failed_count: row.failed_count,
            seo_enabled: row.seo_enabled,
            status: string_to_status(&row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
        }
    }
}
