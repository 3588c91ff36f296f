/**
 * Routes Module
 * API route handlers and the request/response plumbing they share
 */
pub mod about;
pub mod auth;
pub mod categories;
pub mod config;
pub mod gallery;
pub mod health;
pub mod hero;
pub mod links;
pub mod site;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

// ============================================================================
// Shared Response Types
// ============================================================================

/// Error body returned by every failing handler
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

// ============================================================================
// Shared Request Types
// ============================================================================

/// `?id=` query of the DELETE endpoints
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: i32,
}

/// Element of an array-form reorder body: `[{ "id": 3 }, { "id": 1 }]`
#[derive(Debug, Deserialize, Serialize)]
pub struct IdRef {
    pub id: i32,
}

/// Body of the dedicated site-wide `/reorder` endpoints
#[derive(Debug, Deserialize, Serialize)]
pub struct ReorderRequest {
    pub ids: Vec<i32>,
}

pub fn ids_of(refs: &[IdRef]) -> Vec<i32> {
    refs.iter().map(|r| r.id).collect()
}

// ============================================================================
// Extractors
// ============================================================================

/// `Json` whose rejections use the API error shape.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}

/// `Query` whose rejections use the API error shape.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Trimmed value of a required text field.
pub fn required(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Trimmed optional text; blank collapses to `None`.
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
