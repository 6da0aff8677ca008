//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use gesture_inference::{ErrorKind, InferenceError};
use gesture_models::ErrorResponse;

use crate::config::is_production_environment;

pub type ApiResult<T> = Result<T, ApiError>;

/// Message for payloads that are neither a JSON array nor a number list.
pub const INVALID_FEATURES_MESSAGE: &str =
    "Invalid features format. Use JSON array or comma-separated values";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Inference(e) => match e.kind() {
                ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
                ErrorKind::ServerFault | ErrorKind::LabelSetMismatch => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Caller-facing message.
    fn message(&self) -> String {
        match self {
            ApiError::Inference(InferenceError::Parse(_)) => INVALID_FEATURES_MESSAGE.to_string(),
            ApiError::Inference(InferenceError::LabelSetMismatch { .. }) => {
                format!("Prediction error: {self}")
            }
            _ => self.to_string(),
        }
    }

    /// Message for the response body. Server faults are redacted in production.
    fn public_message(&self, production: bool) -> String {
        if production && self.status_code().is_server_error() {
            "An internal error occurred".to_string()
        } else {
            self.message()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let production = std::env::var("ENVIRONMENT")
            .map(|v| is_production_environment(&v))
            .unwrap_or(false);
        let error = self.public_message(production);

        (status, Json(ErrorResponse { error })).into_response()
    }
}
