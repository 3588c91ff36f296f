/**
 * Config Routes
 * Admin access to the raw `site_config` key/value table
 */
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AdminSession;
use crate::db::models::SiteConfigEntry;
use crate::error::ApiResult;
use crate::routes::ApiJson;
use crate::site_config::ADMIN_PASSWORD_KEY;
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct ConfigItem {
    pub key: String,
    /// Strings are stored as-is; any other JSON value is stored serialized.
    pub value: Value,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateConfigRequest {
    pub configs: Vec<ConfigItem>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ConfigKeyResult {
    pub key: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateConfigResponse {
    /// True only when every key was written
    pub success: bool,
    pub results: Vec<ConfigKeyResult>,
}

// ============================================================================
// Validation
// ============================================================================

fn stored_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Reason a key may not be written through the batch endpoint. Any other
/// key is accepted; readers decide what it means.
fn rejected_key(key: &str) -> Option<String> {
    if key.trim().is_empty() {
        return Some("key is required".to_string());
    }
    if key == ADMIN_PASSWORD_KEY {
        return Some("The admin password can only be changed via /api/auth/password".to_string());
    }
    None
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/config
/// Every stored entry except the admin password
pub async fn list_config(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SiteConfigEntry>>> {
    let entries = state
        .store
        .list_config()
        .await?
        .into_iter()
        .filter(|e| e.key != ADMIN_PASSWORD_KEY)
        .collect();
    Ok(Json(entries))
}

/// PUT /api/config
/// Each key is upserted on its own; one failing key never undoes the others
pub async fn update_config(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdateConfigRequest>,
) -> ApiResult<Json<UpdateConfigResponse>> {
    let mut results = Vec::with_capacity(payload.configs.len());

    for item in payload.configs {
        if let Some(reason) = rejected_key(&item.key) {
            results.push(ConfigKeyResult {
                key: item.key,
                success: false,
                error: Some(reason),
            });
            continue;
        }

        let value = stored_value(item.value);
        match state.store.upsert_config(&item.key, &value).await {
            Ok(_) => results.push(ConfigKeyResult {
                key: item.key,
                success: true,
                error: None,
            }),
            Err(e) => {
                tracing::error!("Failed to save config key '{}': {}", item.key, e);
                results.push(ConfigKeyResult {
                    key: item.key,
                    success: false,
                    error: Some("Failed to save value".to_string()),
                });
            }
        }
    }

    let success = results.iter().all(|r| r.success);
    Ok(Json(UpdateConfigResponse { success, results }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::routes::test_support::{admin_token, send, state, state_with};
    use crate::store::MemoryStore;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[test]
    fn test_key_rules() {
        assert!(rejected_key("hero_title").is_none());
        assert!(rejected_key("admin_title_2").is_none());
        assert!(rejected_key("Hero-Title").is_none());
        assert!(rejected_key("").is_some());
        assert!(rejected_key("  ").is_some());
        assert!(rejected_key("admin_password").is_some());
    }

    #[test]
    fn test_non_string_values_are_serialized() {
        assert_eq!(stored_value(json!("plain")), "plain");
        assert_eq!(stored_value(json!([3, 1])), "[3,1]");
    }

    #[tokio::test]
    async fn test_list_hides_password() {
        let state = state();
        let token = admin_token(&state);
        state
            .store
            .upsert_config("admin_password", "hunter2")
            .await
            .unwrap();
        state.store.upsert_config("site_name", "Nav").await.unwrap();

        let (status, body) = send(
            crate::create_app(state),
            Method::GET,
            "/api/config",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{ "key": "site_name", "value": "Nav" }]));
    }

    #[tokio::test]
    async fn test_batch_failure_is_isolated_per_key() {
        let store = Arc::new(MemoryStore::new());
        store.fail_config_key("site_slogan").await;
        let state = state_with(store);
        let token = admin_token(&state);

        let (status, body) = send(
            crate::create_app(state.clone()),
            Method::PUT,
            "/api/config",
            Some(&token),
            Some(json!({ "configs": [
                { "key": "site_name", "value": "Nav" },
                { "key": "site_slogan", "value": "Hello" },
                { "key": "featured_links", "value": [4, 2] },
                { "key": "admin_password", "value": "sneaky" }
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["results"][0]["success"], true);
        assert_eq!(body["results"][1]["success"], false);
        assert_eq!(body["results"][2]["success"], true);
        assert_eq!(body["results"][3]["success"], false);

        let stored = state.store.list_config().await.unwrap();
        let value_of = |key: &str| {
            stored
                .iter()
                .find(|e| e.key == key)
                .map(|e| e.value.clone())
        };
        assert_eq!(value_of("site_name").as_deref(), Some("Nav"));
        assert_eq!(value_of("featured_links").as_deref(), Some("[4,2]"));
        assert_eq!(value_of("site_slogan"), None);
        assert_eq!(value_of("admin_password"), None);
    }

    #[tokio::test]
    async fn test_batch_accepts_keys_outside_the_registry() {
        let state = state();
        let token = admin_token(&state);

        let (status, body) = send(
            crate::create_app(state.clone()),
            Method::PUT,
            "/api/config",
            Some(&token),
            Some(json!({ "configs": [
                { "key": "theme", "value": "dark" },
                { "key": "Link.Tags", "value": ["art", "type"] }
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let stored = state.store.list_config().await.unwrap();
        assert!(stored.iter().any(|e| e.key == "theme" && e.value == "dark"));
        assert!(stored
            .iter()
            .any(|e| e.key == "Link.Tags" && e.value == r#"["art","type"]"#));
    }

    #[tokio::test]
    async fn test_config_requires_session() {
        let (status, _) = send(
            crate::create_app(state()),
            Method::GET,
            "/api/config",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
