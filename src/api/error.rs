use crate::aggregator::GradeError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Request failures, split by whether computation was attempted.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body has the wrong shape. Nothing was computed.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The grade table could not be read while computing.
    #[error(transparent)]
    Computation(#[from] GradeError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Computation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::Validation(_) => json!({ "error": "Invalid request" }),
            ApiError::Computation(e) => json!({ "error": "Server error", "detail": e.to_string() }),
        };
        (self.status(), Json(body)).into_response()
    }
}
