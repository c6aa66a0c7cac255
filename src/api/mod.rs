//! API layer -- axum routes, handlers, and middleware.

pub mod error;
mod routes;
pub mod state;

use std::time::Duration;

use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use self::error::ApiError;
use self::state::AppState;

/// Build the application router with all API routes.
///
/// Incident routes are served both at the root and under `/api/v1`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .merge(routes::incident_routes())
        .nest("/api/v1", routes::incident_routes())
        .fallback(fallback)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(12 * 60 * 60))
}

async fn fallback() -> ApiError {
    ApiError::NotFound
}
