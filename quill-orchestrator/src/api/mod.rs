//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod batch;
pub mod error;
pub mod health;
pub mod step;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::repository::PipelineStore;
use crate::service::Dispatcher;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PipelineStore>,
    pub dispatcher: Dispatcher,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Batch endpoints
        .route("/batch", post(batch::create_batch))
        .route("/batch/{id}", get(batch::get_batch))
        .route("/batch/{id}/blogs", get(batch::list_blogs))
        // Pipeline step
        .route("/batch/{id}/step", post(step::advance_step))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
