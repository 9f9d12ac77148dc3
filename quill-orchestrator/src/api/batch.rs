//! Batch API Handlers
//!
//! HTTP endpoints for submitting and inspecting batches.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use quill_core::domain::batch::Batch;
use quill_core::domain::blog::Blog;
use quill_core::dto::batch::{BatchDetail, CreateBatch};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::batch_service;

/// POST /batch
/// Submit a new batch of keywords
pub async fn create_batch(
    State(state): State<AppState>,
    Json(req): Json<CreateBatch>,
) -> ApiResult<(StatusCode, Json<Batch>)> {
    tracing::info!("Submitting batch of {} keywords", req.keywords.len());

    let batch = batch_service::create_batch(state.store.as_ref(), req).await?;

    Ok((StatusCode::CREATED, Json(batch)))
}

/// GET /batch/{id}
/// Get a batch with its jobs
pub async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BatchDetail>> {
    tracing::debug!("Getting batch: {}", id);

    let detail = batch_service::get_batch(state.store.as_ref(), id).await?;

    Ok(Json(detail))
}

/// GET /batch/{id}/blogs
/// List the blogs generated for a batch
pub async fn list_blogs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Blog>>> {
    tracing::debug!("Listing blogs of batch: {}", id);

    let blogs = batch_service::list_blogs(state.store.as_ref(), id).await?;

    Ok(Json(blogs))
}
