//! Blog Repository
//!
//! Handles all database operations related to generated blogs.
//! A job owns at most one blog (`blogs.job_id` is unique).

use quill_core::domain::blog::{Blog, NewBlog};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Insert the blog of a job
///
/// Returns false when the job already has one.
pub async fn insert<'e, E>(executor: E, job_id: Uuid, blog: &NewBlog) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO blogs (
            id, job_id, keyword, title, meta_description, content, word_count,
            internal_links, seo_score, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (job_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job_id)
    .bind(&blog.keyword)
    .bind(&blog.title)
    .bind(&blog.meta_description)
    .bind(&blog.content)
    .bind(blog.word_count)
    .bind(&blog.internal_links)
    .bind(blog.seo_score)
    .bind(chrono::Utc::now())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Find the blog generated for a job
pub async fn find_by_job(pool: &PgPool, job_id: Uuid) -> Result<Option<Blog>, sqlx::Error> {
    let row = sqlx::query_as::<_, BlogRow>(
        r#"
        SELECT id, job_id, keyword, title, meta_description, content, word_count,
               internal_links, seo_score, created_at
        FROM blogs
        WHERE job_id = $1
        "#,
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Find all blogs of a batch, in job order
pub async fn find_by_batch(pool: &PgPool, batch_id: Uuid) -> Result<Vec<Blog>, sqlx::Error> {
    let rows = sqlx::query_as::<_, BlogRow>(
        r#"
        SELECT b.id, b.job_id, b.keyword, b.title, b.meta_description, b.content,
               b.word_count, b.internal_links, b.seo_score, b.created_at
        FROM blogs b
        JOIN jobs j ON j.id = b.job_id
        WHERE j.batch_id = $1
        ORDER BY j.created_at ASC, j.position ASC
        "#,
    )
    .bind(batch_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct BlogRow {
    id: Uuid,
    job_id: Uuid,
    keyword: String,
    title: String,
    meta_description: String,
    content: String,
    word_count: i32,
    internal_links: Vec<String>,
    seo_score: Option<i32>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<BlogRow> for Blog {
    fn from(row: BlogRow) -> Self {
        Blog {
            id: row.id,
            job_id: row.job_id,
            keyword: row.keyword,
            title: row.title,
            meta_description: row.meta_description,
            content: row.content,
            word_count: row.word_count,
            internal_links: row.internal_links,
            seo_score: row.seo_score,
            created_at: row.created_at,
        }
    }
}
