/**
 * Category Routes
 * Public directory listing and admin management of categories
 */
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AdminSession;
use crate::db::models::Category;
use crate::error::ApiResult;
use crate::routes::{
    ids_of, required, ApiJson, ApiQuery, IdQuery, IdRef, ReorderRequest, SuccessResponse,
};
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateCategoryRequest {
    pub id: i32,
    pub name: String,
}

/// Body of `PUT /api/categories`: a full reordered id list or a rename.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CategoryPut {
    Reorder(Vec<IdRef>),
    Update(UpdateCategoryRequest),
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/categories
/// Every category by sort order, each with its links by sort order
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.store.list_categories().await?))
}

/// POST /api/categories
pub async fn create_category(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let name = required("name", &payload.name)?;
    let category = state.store.create_category(&name).await?;

    tracing::info!(id = category.id, name = %category.name, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories
/// `{id, name}` renames; `[{id}, ...]` reorders the whole group
pub async fn update_categories(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CategoryPut>,
) -> ApiResult<Response> {
    match payload {
        CategoryPut::Reorder(refs) => {
            let categories = state.store.reorder_categories(&ids_of(&refs)).await?;
            Ok(Json(categories).into_response())
        }
        CategoryPut::Update(update) => {
            let name = required("name", &update.name)?;
            let category = state.store.rename_category(update.id, &name).await?;
            Ok(Json(category).into_response())
        }
    }
}

/// PUT /api/categories/reorder
pub async fn reorder_categories(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ReorderRequest>,
) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.store.reorder_categories(&payload.ids).await?))
}

/// DELETE /api/categories?id=
/// Removes the category together with its links
pub async fn delete_category(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> ApiResult<Json<SuccessResponse>> {
    let removed_links = state.store.delete_category(query.id).await?;

    tracing::info!(id = query.id, removed_links, "category deleted");
    Ok(SuccessResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{admin_token, send, state};
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_is_public() {
        let (status, body) = send(
            crate::create_app(state()),
            Method::GET,
            "/api/categories",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_create_requires_session() {
        let (status, body) = send(
            crate::create_app(state()),
            Method::POST,
            "/api/categories",
            None,
            Some(json!({ "name": "Fonts" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authorization required");
    }

    #[tokio::test]
    async fn test_create_appends_and_rejects_duplicates() {
        let state = state();
        let token = admin_token(&state);

        let (status, first) = send(
            crate::create_app(state.clone()),
            Method::POST,
            "/api/categories",
            Some(&token),
            Some(json!({ "name": "Fonts" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["sortOrder"], 0);

        let (_, second) = send(
            crate::create_app(state.clone()),
            Method::POST,
            "/api/categories",
            Some(&token),
            Some(json!({ "name": "Colors" })),
        )
        .await;
        assert_eq!(second["sortOrder"], 1);

        let (status, _) = send(
            crate::create_app(state.clone()),
            Method::POST,
            "/api/categories",
            Some(&token),
            Some(json!({ "name": "Fonts" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_blank_name_is_validation_error() {
        let state = state();
        let token = admin_token(&state);
        let (status, _) = send(
            crate::create_app(state),
            Method::POST,
            "/api/categories",
            Some(&token),
            Some(json!({ "name": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let state = state();
        let token = admin_token(&state);
        let (status, body) = send(
            crate::create_app(state),
            Method::POST,
            "/api/categories",
            Some(&token),
            Some(json!({ "title": "Fonts" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request");
    }

    #[tokio::test]
    async fn test_put_array_reorders_and_object_renames() {
        let state = state();
        let token = admin_token(&state);
        let a = state.store.create_category("A").await.unwrap();
        let b = state.store.create_category("B").await.unwrap();

        let (status, body) = send(
            crate::create_app(state.clone()),
            Method::PUT,
            "/api/categories",
            Some(&token),
            Some(json!([{ "id": b.id }, { "id": a.id }])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], b.id);
        assert_eq!(body[0]["sortOrder"], 0);
        assert_eq!(body[1]["sortOrder"], 1);

        let (status, body) = send(
            crate::create_app(state.clone()),
            Method::PUT,
            "/api/categories",
            Some(&token),
            Some(json!({ "id": a.id, "name": "Alpha" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Alpha");
    }

    #[tokio::test]
    async fn test_partial_reorder_is_conflict() {
        let state = state();
        let token = admin_token(&state);
        let a = state.store.create_category("A").await.unwrap();
        state.store.create_category("B").await.unwrap();

        let (status, body) = send(
            crate::create_app(state.clone()),
            Method::PUT,
            "/api/categories/reorder",
            Some(&token),
            Some(json!({ "ids": [a.id] })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Stale ordering");
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let state = state();
        let token = admin_token(&state);
        let (status, _) = send(
            crate::create_app(state),
            Method::DELETE,
            "/api/categories?id=42",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_without_id_is_validation_error() {
        let state = state();
        let token = admin_token(&state);
        let (status, _) = send(
            crate::create_app(state),
            Method::DELETE,
            "/api/categories",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
