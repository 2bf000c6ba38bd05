//! API error type and domain-error mappings.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use vent_moderation::ModerationError;
use vent_profile::ProfileError;
use vent_records::RecordError;
use vent_session::SessionError;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<RecordError> for ApiError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::VentNotFound(_) => ApiError::NotFound(e.to_string()),
            RecordError::EmptyText => ApiError::BadRequest(e.to_string()),
            RecordError::CommentsDisabled(_) | RecordError::NotPublished(_) => {
                ApiError::Conflict(e.to_string())
            }
            RecordError::Database(_) | RecordError::Json(_) => {
                tracing::error!(error = %e, "record operation failed");
                ApiError::InternalServerError(e.to_string())
            }
        }
    }
}

impl From<ModerationError> for ApiError {
    fn from(e: ModerationError) -> Self {
        match e {
            ModerationError::NotAuthorized(_) => ApiError::Forbidden(e.to_string()),
            ModerationError::VentNotFound(_) => ApiError::NotFound(e.to_string()),
            ModerationError::AlreadyReviewed { .. } => ApiError::Conflict(e.to_string()),
            ModerationError::Database(_) => {
                tracing::error!(error = %e, "moderation operation failed");
                ApiError::InternalServerError(e.to_string())
            }
            ModerationError::Record(inner) => inner.into(),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(e: ProfileError) -> Self {
        tracing::error!(error = %e, "profile operation failed");
        ApiError::InternalServerError(e.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Record(inner) => inner.into(),
            SessionError::Profile(inner) => inner.into(),
        }
    }
}
