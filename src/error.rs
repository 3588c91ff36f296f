//! API error type. Every handler failure is turned into a JSON
//! `ErrorResponse` with a matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::routes::ErrorResponse;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    DuplicateName(String),

    #[error("{0}")]
    OrderingConflict(String),

    #[error("{0}")]
    InvalidReference(String),

    #[error("{0}")]
    Authentication(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Database not available")]
    StoreUnavailable,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidReference(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DuplicateName(_) | ApiError::OrderingConflict(_) => StatusCode::CONFLICT,
            ApiError::Authentication(_) | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "Invalid request",
            ApiError::NotFound(_) => "Not found",
            ApiError::DuplicateName(_) => "Name already exists",
            ApiError::OrderingConflict(_) => "Stale ordering",
            ApiError::InvalidReference(_) => "Invalid reference",
            ApiError::Authentication(_) => "Authorization required",
            ApiError::InvalidCredentials => "Invalid credentials",
            ApiError::StoreUnavailable => "Database not available",
            ApiError::Internal => "Internal server error",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            StoreError::DuplicateName { .. } => ApiError::DuplicateName(e.to_string()),
            StoreError::MissingCategory(_) => ApiError::InvalidReference(e.to_string()),
            StoreError::Ordering(inner) => ApiError::OrderingConflict(inner.to_string()),
            StoreError::Unavailable(detail) => {
                tracing::error!(error = %detail, "store unavailable");
                ApiError::StoreUnavailable
            }
            StoreError::Backend(detail) => {
                tracing::error!(error = %detail, "store error");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::InvalidCredentials | ApiError::StoreUnavailable | ApiError::Internal => None,
            other => Some(other.to_string()),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.title().to_string(),
                message,
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
