/**
 * Auth Routes
 * Admin login/logout, session verification and password change
 */
use axum::{extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{self, AdminSession, AuthError, SESSION_COOKIE};
use crate::error::ApiResult;
use crate::routes::ApiJson;
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChangePasswordResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

fn session_cookie(token: String) -> Cookie<'static> {
    let secure = std::env::var("ENVIRONMENT").is_ok_and(|env| env == "production");
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
/// Checks the admin password and opens a 24h session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    match auth::login(
        state.store.as_ref(),
        &state.sessions,
        &payload.password,
        Utc::now(),
    )
    .await
    {
        Ok(session) => {
            tracing::info!("Admin login succeeded");
            let jar = jar.add(session_cookie(session.token.clone()));
            Ok((
                StatusCode::OK,
                jar,
                Json(LoginResponse {
                    success: true,
                    message: None,
                    token: Some(session.token),
                    expires_at: Some(session.expires_at),
                }),
            ))
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Admin login failed: wrong password");
            Ok((
                StatusCode::UNAUTHORIZED,
                jar,
                Json(LoginResponse {
                    success: false,
                    message: Some("Invalid password".to_string()),
                    token: None,
                    expires_at: None,
                }),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /api/auth/verify
/// Reports whether the presented session is still valid
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let token = match auth::session_token(&headers) {
        Some(t) => t,
        None => {
            return Json(VerifyResponse {
                success: false,
                is_valid: false,
                expires_at: None,
                error: Some("No session token provided".to_string()),
            });
        }
    };

    match state.sessions.verify(&token, Utc::now()) {
        Ok(claims) => Json(VerifyResponse {
            success: true,
            is_valid: true,
            expires_at: Some(claims.expires_at()),
            error: None,
        }),
        Err(e) => Json(VerifyResponse {
            success: false,
            is_valid: false,
            expires_at: None,
            error: Some(e.to_string()),
        }),
    }
}

/// POST /api/auth/logout
/// Clears the session cookie. Tokens are not revoked server-side.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    // Emitted even when the request carried no cookie
    let mut expired = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    expired.make_removal();
    (jar.add(expired), Json(LogoutResponse { success: true }))
}

/// PUT /api/auth/password
pub async fn change_password(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> ApiResult<(StatusCode, Json<ChangePasswordResponse>)> {
    match auth::change_password(
        state.store.as_ref(),
        &payload.old_password,
        &payload.new_password,
    )
    .await
    {
        Ok(()) => {
            tracing::info!("Admin password changed");
            Ok((
                StatusCode::OK,
                Json(ChangePasswordResponse {
                    success: true,
                    message: Some("Password updated".to_string()),
                }),
            ))
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Password change failed: wrong current password");
            Ok((
                StatusCode::UNAUTHORIZED,
                Json(ChangePasswordResponse {
                    success: false,
                    message: Some("Current password is incorrect".to_string()),
                }),
            ))
        }
        Err(e) => Err(e.into()),
    }
}
