//! Error types for the Text Scanner server

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::controller::upload_error_message;
use crate::imaging::ImageError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn session_not_found(id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("Session not found: {}", id))
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Image(e) => {
                let status = match e {
                    ImageError::Empty => StatusCode::BAD_REQUEST,
                    ImageError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    ImageError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, "image_error", upload_error_message(e))
            }
            AppError::Multipart(e) => (e.status(), "bad_request", e.body_text()),
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "serialization_error",
                    "Failed to serialize response".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
