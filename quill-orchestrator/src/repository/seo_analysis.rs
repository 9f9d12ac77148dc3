//! SEO Analysis Repository
//!
//! Keyword-level cache of SEO analyses. Stored payloads are replaced whole,
//! never merged.

use quill_core::domain::seo::SeoAnalysis;
use sqlx::PgPool;
use sqlx::types::Json;

/// Find the cached analysis for a keyword
pub async fn find_by_keyword(
    pool: &PgPool,
    keyword: &str,
) -> Result<Option<SeoAnalysis>, sqlx::Error> {
    let row: Option<(Json<SeoAnalysis>,)> =
        sqlx::query_as("SELECT payload FROM seo_analyses WHERE keyword = $1")
            .bind(keyword)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(payload,)| payload.0))
}

/// Insert or overwrite the cached analysis for a keyword
pub async fn upsert(pool: &PgPool, keyword: &str, analysis: &SeoAnalysis) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO seo_analyses (keyword, payload, fetched_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (keyword) DO UPDATE
        SET payload = EXCLUDED.payload, fetched_at = EXCLUDED.fetched_at
        "#,
    )
    .bind(keyword)
    .bind(Json(analysis))
    .bind(chrono::Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}
