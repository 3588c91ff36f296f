/**
 * Gallery Routes
 * Image gallery shown on the public site, newest first
 */
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::auth::AdminSession;
use crate::db::models::GalleryImage;
use crate::error::ApiResult;
use crate::routes::{optional, required, ApiJson, ApiQuery, IdQuery, SuccessResponse};
use crate::store::GalleryPatch;
use crate::AppState;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateImageRequest {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateImageRequest {
    pub id: i32,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// GET /api/gallery
pub async fn list_images(State(state): State<AppState>) -> ApiResult<Json<Vec<GalleryImage>>> {
    Ok(Json(state.store.list_gallery().await?))
}

/// POST /api/gallery
pub async fn create_image(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateImageRequest>,
) -> ApiResult<(StatusCode, Json<GalleryImage>)> {
    let url = required("url", &payload.url)?;
    let title = optional(payload.title.as_deref());

    let image = state
        .store
        .create_gallery_image(&url, title.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// PUT /api/gallery
pub async fn update_image(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdateImageRequest>,
) -> ApiResult<Json<GalleryImage>> {
    let patch = GalleryPatch {
        url: payload
            .url
            .as_deref()
            .map(|url| required("url", url))
            .transpose()?,
        title: payload.title.map(|t| t.trim().to_string()),
    };

    Ok(Json(
        state.store.update_gallery_image(payload.id, &patch).await?,
    ))
}

/// DELETE /api/gallery?id=
pub async fn delete_image(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> ApiResult<Json<SuccessResponse>> {
    state.store.delete_gallery_image(query.id).await?;
    Ok(SuccessResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{admin_token, send, state};
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_list_newest_first() {
        let state = state();
        let token = admin_token(&state);

        for url in ["/img/a.png", "/img/b.png"] {
            let (status, _) = send(
                crate::create_app(state.clone()),
                Method::POST,
                "/api/gallery",
                Some(&token),
                Some(json!({ "url": url })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) =
            send(crate::create_app(state), Method::GET, "/api/gallery", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["url"], "/img/b.png");
        assert_eq!(body[1]["url"], "/img/a.png");
        assert!(body[0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_url() {
        let state = state();
        let token = admin_token(&state);
        let image = state
            .store
            .create_gallery_image("/img/a.png", None)
            .await
            .unwrap();

        let (status, body) = send(
            crate::create_app(state),
            Method::PUT,
            "/api/gallery",
            Some(&token),
            Some(json!({ "id": image.id, "title": "Sunset" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "/img/a.png");
        assert_eq!(body["title"], "Sunset");
    }

    #[tokio::test]
    async fn test_update_unknown_image_is_not_found() {
        let state = state();
        let token = admin_token(&state);
        let (status, _) = send(
            crate::create_app(state),
            Method::PUT,
            "/api/gallery",
            Some(&token),
            Some(json!({ "id": 5, "title": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_without_url_is_rejected() {
        let state = state();
        let token = admin_token(&state);
        let (status, _) = send(
            crate::create_app(state),
            Method::POST,
            "/api/gallery",
            Some(&token),
            Some(json!({ "url": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
