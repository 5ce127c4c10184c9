//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use vital_core::RelayError;

use crate::models::ErrorResponse;

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed. Use POST to send messages.";

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Relay(e) => (e.status(), e.public_message()),
            AppError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE)
            }
        };
        let body = Json(ErrorResponse {
            error: message.to_string(),
        });
        (status, body).into_response()
    }
}
