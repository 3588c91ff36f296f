/**
 * Link Routes
 * Link listing, admin management and the public click counter
 */
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AdminSession;
use crate::db::models::{Link, LinkInput};
use crate::error::{ApiError, ApiResult};
use crate::routes::{
    ids_of, optional, required, ApiJson, ApiQuery, IdQuery, IdRef, SuccessResponse,
};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinksQuery {
    pub category_id: Option<i32>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkRequest {
    pub id: i32,
    #[serde(flatten)]
    pub link: LinkInput,
}

/// Body of `PUT /api/links`: a reordered id list or a full link update.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LinkPut {
    Reorder(Vec<IdRef>),
    Update(UpdateLinkRequest),
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderLinksRequest {
    pub category_id: i32,
    pub ids: Vec<i32>,
}

// ============================================================================
// Validation
// ============================================================================

lazy_static::lazy_static! {
    // Absolute http(s) URL or a site-relative path
    static ref LINK_URL_REGEX: Regex =
        Regex::new(r"^(?:https?://[^\s/?#]+[^\s]*|/[^\s]*)$").unwrap();
}

fn validate_link(input: LinkInput) -> ApiResult<LinkInput> {
    let title = required("title", &input.title)?;
    let url = required("url", &input.url)?;
    if !LINK_URL_REGEX.is_match(&url) {
        return Err(ApiError::Validation(format!(
            "url must be an http(s) URL or a site-relative path, got '{}'",
            url
        )));
    }

    Ok(LinkInput {
        title,
        url,
        icon: optional(input.icon.as_deref()),
        snapshot_url: optional(input.snapshot_url.as_deref()),
        description: optional(input.description.as_deref()),
        category_id: input.category_id,
    })
}

/// Link id from a click body. Accepts `{"id": 3}`, `{"id": "3"}` or a bare id.
fn click_target(body: &[u8]) -> Option<i32> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let id = match &value {
        Value::Object(map) => map.get("id")?,
        other => other,
    };

    match id {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/links?categoryId=
pub async fn list_links(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LinksQuery>,
) -> ApiResult<Json<Vec<Link>>> {
    Ok(Json(state.store.list_links(query.category_id).await?))
}

/// POST /api/links
pub async fn create_link(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LinkInput>,
) -> ApiResult<(StatusCode, Json<Link>)> {
    let input = validate_link(payload)?;
    let link = state.store.create_link(&input).await?;

    tracing::info!(id = link.id, category_id = link.category_id, "link created");
    Ok((StatusCode::CREATED, Json(link)))
}

/// PUT /api/links
/// `{id, ...}` updates one link; `[{id}, ...]` reorders one category's links
pub async fn update_links(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LinkPut>,
) -> ApiResult<Response> {
    match payload {
        LinkPut::Reorder(refs) => {
            let ids = ids_of(&refs);
            let category_id = owning_category(&state, &ids).await?;
            let links = state.store.reorder_links(category_id, &ids).await?;
            Ok(Json(links).into_response())
        }
        LinkPut::Update(update) => {
            let input = validate_link(update.link)?;
            let link = state.store.update_link(update.id, &input).await?;
            Ok(Json(link).into_response())
        }
    }
}

/// Category shared by every id of an array-form reorder.
async fn owning_category(state: &AppState, ids: &[i32]) -> ApiResult<i32> {
    let first = *ids
        .first()
        .ok_or_else(|| ApiError::Validation("reorder list must not be empty".to_string()))?;

    let links = state.store.list_links(None).await?;
    let category_of = |id: i32| links.iter().find(|l| l.id == id).map(|l| l.category_id);

    let category_id = category_of(first).ok_or_else(|| {
        ApiError::OrderingConflict(format!("link {} is not part of any category", first))
    })?;
    if ids.iter().any(|&id| category_of(id) != Some(category_id)) {
        return Err(ApiError::OrderingConflict(format!(
            "reorder list mixes links outside category {}",
            category_id
        )));
    }

    Ok(category_id)
}

/// PUT /api/links/reorder
pub async fn reorder_links(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ReorderLinksRequest>,
) -> ApiResult<Json<Vec<Link>>> {
    let links = state
        .store
        .reorder_links(payload.category_id, &payload.ids)
        .await?;
    Ok(Json(links))
}

/// DELETE /api/links?id=
pub async fn delete_link(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> ApiResult<Json<SuccessResponse>> {
    state.store.delete_link(query.id).await?;
    Ok(SuccessResponse::ok())
}

/// POST /api/links/click
/// Public click counter. Never fails: unknown or malformed ids are ignored.
pub async fn record_click(State(state): State<AppState>, body: Bytes) -> Json<SuccessResponse> {
    match click_target(&body) {
        Some(id) => match state.store.increment_clicks(id).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(id, "click on unknown link ignored"),
            Err(e) => tracing::warn!("Failed to record click for link {}: {}", id, e),
        },
        None => tracing::debug!("click without a usable link id ignored"),
    }

    SuccessResponse::ok()
}
