use std::sync::Arc;

use anyhow::Context;
use quill_content::LinkCatalog;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod provider;
pub mod repository;
pub mod service;

use crate::config::Config;
use crate::repository::{PgStore, PipelineStore};
use crate::service::{Dispatcher, StageContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill_orchestrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Quill Orchestrator...");

    let config = Config::from_env().context("Failed to read configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing::info!("Connecting to database...");

    // Create database connection pool
    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Database connection pool created");

    // Run migrations
    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let providers = provider::build_providers(&config).context("Failed to build providers")?;

    let store: Arc<dyn PipelineStore> = Arc::new(PgStore::new(pool));

    let dispatcher = Dispatcher::new(StageContext {
        store: store.clone(),
        providers,
        config: config.pipeline.clone(),
        catalog: LinkCatalog::habitto(),
    });

    // Build router with all API endpoints
    let app = api::create_router(api::AppState { store, dispatcher });

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
