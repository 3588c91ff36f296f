/**
 * About Routes
 * The single "about" block of the public site
 */
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::auth::AdminSession;
use crate::db::models::AboutContent;
use crate::error::ApiResult;
use crate::routes::{required, ApiJson};
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct AboutRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// GET /api/about
/// The current record, or `null` when none exists yet
pub async fn get_about(State(state): State<AppState>) -> ApiResult<Json<Option<AboutContent>>> {
    Ok(Json(state.store.current_about().await?))
}

/// PUT /api/about
/// Overwrites the current record, creating it on first use
pub async fn put_about(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AboutRequest>,
) -> ApiResult<Json<AboutContent>> {
    let title = required("title", &payload.title)?;
    let about = state
        .store
        .upsert_current_about(&title, payload.description.trim())
        .await?;
    Ok(Json(about))
}

/// POST /api/about
/// Inserts a new row. Readers keep seeing the lowest id.
pub async fn create_about(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AboutRequest>,
) -> ApiResult<(StatusCode, Json<AboutContent>)> {
    let title = required("title", &payload.title)?;
    let about = state
        .store
        .create_about(&title, payload.description.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(about)))
}
