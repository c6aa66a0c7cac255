//! Error responses for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::incident::pipeline::PipelineError;
use crate::incident::validate::ValidationErrors;
use crate::storage::StoreError;

/// Failures that reach an API caller.
///
/// Each variant renders as `{"error": <label>, "details": ...}`.
#[derive(Debug)]
pub enum ApiError {
    MalformedRequest(String),
    ValidationFailed(ValidationErrors),
    CreateFailed(String),
    RetrieveFailed(String),
    NotFound,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_) | ApiError::ValidationFailed(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::CreateFailed(_) | ApiError::RetrieveFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn body(&self) -> Value {
        match self {
            ApiError::MalformedRequest(details) => {
                json!({ "error": "Invalid JSON format", "details": details })
            }
            ApiError::ValidationFailed(errors) => {
                json!({ "error": "Validation failed", "details": errors })
            }
            ApiError::CreateFailed(details) => {
                json!({ "error": "Failed to create incident", "details": details })
            }
            ApiError::RetrieveFailed(details) => {
                json!({ "error": "Failed to retrieve incidents", "details": details })
            }
            ApiError::NotFound => json!({ "error": "Not found" }),
        }
    }

    /// Map a pipeline failure from the create operation.
    pub fn from_create(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(errors) => ApiError::ValidationFailed(errors),
            PipelineError::Persistence(e) => ApiError::CreateFailed(e.to_string()),
        }
    }

    /// Map a pipeline failure from the read-all operation.
    pub fn from_retrieve(err: StoreError) -> Self {
        ApiError::RetrieveFailed(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!(status = %self.status(), body = %self.body(), "request failed");
        }
        (self.status(), Json(self.body())).into_response()
    }
}
