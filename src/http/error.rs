//! Error responses for the HTTP API.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::SentimentError;

/// JSON error body: `{"detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Error returned by request handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Request body failed validation (422).
    Validation(String),
    /// Body could not be extracted as JSON; keeps axum's status code.
    Rejection(StatusCode, String),
    /// Scoring failed (500).
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Rejection(status, _) => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SentimentError> for ApiError {
    fn from(err: SentimentError) -> Self {
        match err {
            SentimentError::Validation(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejection(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::Validation(detail)
            | ApiError::Rejection(_, detail)
            | ApiError::Internal(detail) => detail,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", detail);
        }
        (status, Json(ErrorBody { detail })).into_response()
    }
}
