use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failures raised by the service layer before they are mapped to HTTP.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("storage error")]
    Storage(#[from] sqlx::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    /// Shorthand for a not-found error about a room looked up by id or code.
    pub fn room_not_found() -> Self {
        ServiceError::NotFound("room not found".into())
    }

    /// Shorthand for a not-found error about a round within a room.
    pub fn round_not_found() -> Self {
        ServiceError::NotFound("round not found".into())
    }
}

/// HTTP-facing error. Every handler returns this; the body is
/// `{"detail": "<message>"}` as the front-end expects.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("internal error")]
    Internal(#[source] sqlx::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(source) => AppError::Internal(source),
            ServiceError::InvalidInput(message)
            | ServiceError::InvalidState(message)
            | ServiceError::Conflict(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(source) => {
                error!(error = %source, "request failed with storage error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let payload = Json(ErrorBody {
            detail: self.to_string(),
        });

        (status, payload).into_response()
    }
}
