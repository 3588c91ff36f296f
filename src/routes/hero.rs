/**
 * Hero Routes
 * Slides of the home page hero carousel
 */
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AdminSession;
use crate::db::models::{HeroSlide, HeroSlideInput};
use crate::error::ApiResult;
use crate::routes::{
    ids_of, optional, required, ApiJson, ApiQuery, IdQuery, IdRef, ReorderRequest,
    SuccessResponse,
};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSlideRequest {
    pub title: String,
    pub subtitle: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code_snippet: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateHeroSlideRequest {
    pub id: i32,
    #[serde(flatten)]
    pub slide: HeroSlideRequest,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HeroPut {
    Reorder(Vec<IdRef>),
    Update(UpdateHeroSlideRequest),
}

fn validate_slide(payload: HeroSlideRequest) -> ApiResult<HeroSlideInput> {
    Ok(HeroSlideInput {
        title: required("title", &payload.title)?,
        subtitle: required("subtitle", &payload.subtitle)?,
        description: optional(payload.description.as_deref()),
        // Snippets are shown verbatim, so only blank ones are dropped
        code_snippet: payload.code_snippet.filter(|s| !s.trim().is_empty()),
        is_active: payload.is_active,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/hero
/// Active slides by sort order
pub async fn list_active_slides(State(state): State<AppState>) -> ApiResult<Json<Vec<HeroSlide>>> {
    Ok(Json(state.store.list_hero_slides(false).await?))
}

/// GET /api/hero/all
pub async fn list_all_slides(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<HeroSlide>>> {
    Ok(Json(state.store.list_hero_slides(true).await?))
}

/// POST /api/hero
pub async fn create_slide(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<HeroSlideRequest>,
) -> ApiResult<(StatusCode, Json<HeroSlide>)> {
    let input = validate_slide(payload)?;
    let slide = state.store.create_hero_slide(&input).await?;
    Ok((StatusCode::CREATED, Json(slide)))
}

/// PUT /api/hero
pub async fn update_slides(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<HeroPut>,
) -> ApiResult<Response> {
    match payload {
        HeroPut::Reorder(refs) => {
            let slides = state.store.reorder_hero_slides(&ids_of(&refs)).await?;
            Ok(Json(slides).into_response())
        }
        HeroPut::Update(update) => {
            let input = validate_slide(update.slide)?;
            let slide = state.store.update_hero_slide(update.id, &input).await?;
            Ok(Json(slide).into_response())
        }
    }
}

/// PUT /api/hero/reorder
pub async fn reorder_slides(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ReorderRequest>,
) -> ApiResult<Json<Vec<HeroSlide>>> {
    Ok(Json(state.store.reorder_hero_slides(&payload.ids).await?))
}

/// DELETE /api/hero?id=
pub async fn delete_slide(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> ApiResult<Json<SuccessResponse>> {
    state.store.delete_hero_slide(query.id).await?;
    Ok(SuccessResponse::ok())
}
