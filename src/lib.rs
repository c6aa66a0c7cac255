//! IncidentDesk -- incident tracking with AI-assisted triage.
//!
//! This crate provides the incident data model and validation, the
//! severity/category classifier, SQLite persistence, and the HTTP API that
//! ties them together.

pub mod api;
pub mod classify;
pub mod config;
pub mod incident;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::ServiceConfig;
use crate::incident::pipeline::IncidentPipeline;
use crate::incident::validate::Validator;
use crate::storage::SqliteIncidentStore;

/// Wire storage, classifier and validator into a pipeline.
pub fn build_pipeline(config: &ServiceConfig) -> Result<IncidentPipeline> {
    let db_path = &config.database.path;
    tracing::info!(db_path = %db_path.display(), "Initializing database");
    let pool = storage::open_pool(db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    let store = Arc::new(SqliteIncidentStore::new(pool));

    let classifier = config.classifier.build()?;

    Ok(IncidentPipeline::new(
        Validator::for_incidents(),
        classifier,
        store,
    ))
}

/// Start the incident API server and run until Ctrl-C.
pub async fn serve(config: &ServiceConfig) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let app = api::router(api::state::AppState::new(pipeline));

    let addr: std::net::SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.server.bind))?;

    tracing::info!(%addr, "IncidentDesk listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("IncidentDesk stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
