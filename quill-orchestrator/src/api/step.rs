//! Step API Handler
//!
//! The externally polled "advance one step" endpoint.

use axum::{
    Json,
    extract::{Path, State},
};
use quill_core::dto::step::{StepRequest, StepResult};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;

/// POST /batch/{id}/step
/// Advance one job of the batch by one stage
///
/// Pipeline failures are reported in the body; only an unknown batch is an
/// HTTP error.
pub async fn advance_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<StepRequest>>,
) -> ApiResult<Json<StepResult>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let result = state
        .dispatcher
        .advance_one_step(id, req.seo_enabled)
        .await?;

    tracing::debug!("Step for batch {}: {:?} - {}", id, result.status, result.message);

    Ok(Json(result))
}
