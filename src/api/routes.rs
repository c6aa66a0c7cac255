//! API route definitions.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use super::error::ApiError;
use super::state::AppState;
use crate::incident::{Incident, IncidentDraft};

pub fn incident_routes() -> Router<AppState> {
    Router::new().route("/incidents", get(list_incidents).post(create_incident))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Incident Management API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn create_incident(
    State(state): State<AppState>,
    payload: Result<Json<IncidentDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Incident>), ApiError> {
    let Json(draft) = payload.map_err(|e| ApiError::MalformedRequest(e.body_text()))?;

    let incident = state
        .pipeline
        .create_incident(draft)
        .await
        .map_err(ApiError::from_create)?;

    Ok((StatusCode::CREATED, Json(incident)))
}

async fn list_incidents(State(state): State<AppState>) -> Result<Json<Vec<Incident>>, ApiError> {
    let incidents = state
        .pipeline
        .get_all_incidents()
        .await
        .map_err(ApiError::from_retrieve)?;
    Ok(Json(incidents))
}
