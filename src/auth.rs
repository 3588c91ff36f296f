/**
 * Auth Gate
 * Shared admin password check and signed, time-boxed session tokens
 *
 * The password lives in cleartext in `site_config.admin_password` with a
 * built-in fallback. Hashing or per-admin accounts would only touch this
 * module.
 */
use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;
use crate::site_config::{SiteConfig, ADMIN_PASSWORD_KEY};
use crate::store::{Store, StoreError};
use crate::AppState;

/// Session lifetime
pub const SESSION_TTL_HOURS: i64 = 24;

/// Cookie carrying the session token for the admin console
pub const SESSION_COOKIE: &str = "admin_session";

pub const DEFAULT_SESSION_SECRET: &str = "default-session-secret-change-in-production";

/// Tolerated clock drift for tokens issued "in the future".
const CLOCK_SKEW_SECS: i64 = 60;

const SESSION_SUBJECT: &str = "admin";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("No session token provided")]
    MissingSession,
    #[error("Invalid session token")]
    InvalidSession,
    #[error("Session expired")]
    Expired,
    #[error("New password must not be empty")]
    EmptyPassword,
    #[error("Failed to create session token: {0}")]
    TokenCreation(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::MissingSession | AuthError::InvalidSession | AuthError::Expired => {
                ApiError::Authentication(e.to_string())
            }
            AuthError::EmptyPassword => ApiError::Validation(e.to_string()),
            AuthError::TokenCreation(inner) => {
                tracing::error!(error = %inner, "failed to sign session token");
                ApiError::Internal
            }
            AuthError::Store(inner) => inner.into(),
        }
    }
}

/// JWT claims of an admin session
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// A freshly issued session
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// HMAC keys for session tokens
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    default_secret: bool,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("default_secret", &self.default_secret)
            .finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            default_secret: secret == DEFAULT_SESSION_SECRET,
        }
    }

    /// Keys from `SESSION_SECRET`, falling back to the development default.
    pub fn from_env() -> Self {
        let secret = std::env::var("SESSION_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_SECRET.to_string());
        Self::new(&secret)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.default_secret
    }

    pub fn issue(&self, now: DateTime<Utc>) -> Result<Session, AuthError> {
        let expires_at = now + Duration::hours(SESSION_TTL_HOURS);
        let claims = Claims {
            sub: SESSION_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(Session {
            token,
            issued_at: now,
            expires_at,
        })
    }

    /// Check the signature, then the age against `now`. Expiry is decided
    /// from the embedded issue time, not from the wall clock of the decoder.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!("Session token rejected: {}", e);
                AuthError::InvalidSession
            })?
            .claims;

        if claims.sub != SESSION_SUBJECT {
            return Err(AuthError::InvalidSession);
        }

        let age = now.timestamp() - claims.iat;
        if age < -CLOCK_SKEW_SECS || age >= SESSION_TTL_HOURS * 3600 {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }
}

/// Compare a presented password with the effective one. An unset password
/// and a wrong one are indistinguishable to the caller.
pub fn password_matches(config: &SiteConfig, presented: &str) -> bool {
    !presented.is_empty() && presented == config.admin_password()
}

/// `LoggedOut -> LoggedIn`: verify the password and issue a session.
pub async fn login(
    store: &dyn Store,
    keys: &SessionKeys,
    password: &str,
    now: DateTime<Utc>,
) -> Result<Session, AuthError> {
    let config = SiteConfig::from_entries(store.list_config().await?);
    if !password_matches(&config, password) {
        return Err(AuthError::InvalidCredentials);
    }
    keys.issue(now)
}

/// Replace the admin password after re-checking the current one.
pub async fn change_password(
    store: &dyn Store,
    old_password: &str,
    new_password: &str,
) -> Result<(), AuthError> {
    let config = SiteConfig::from_entries(store.list_config().await?);
    if !password_matches(&config, old_password) {
        return Err(AuthError::InvalidCredentials);
    }
    if new_password.trim().is_empty() {
        return Err(AuthError::EmptyPassword);
    }

    store.upsert_config(ADMIN_PASSWORD_KEY, new_password).await?;
    Ok(())
}

/// Session token from `Authorization: Bearer` or the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .or_else(|| {
            CookieJar::from_headers(headers)
                .get(SESSION_COOKIE)
                .map(|c| c.value().to_string())
        })
}

/// Extractor guarding admin routes. Rejects with 401 when the request carries
/// no valid, unexpired session.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Claims);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AuthError::MissingSession)?;
        let claims = state.sessions.verify(&token, Utc::now())?;
        Ok(AdminSession(claims))
    }
}
