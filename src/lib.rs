//! Artistic Nav Backend - library for app logic and testing

pub mod auth;
pub mod db;
pub mod error;
pub mod logging;
pub mod ordering;
pub mod routes;
pub mod site_config;
pub mod store;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::{io, net::SocketAddr, sync::Arc};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::auth::SessionKeys;
use crate::store::{MemoryStore, PgStore, Store};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<SessionKeys>,
}

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN, falling back
/// to the local front-end dev server.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors();

    Router::new()
        .route(
            "/api/categories",
            get(routes::categories::list_categories)
                .post(routes::categories::create_category)
                .put(routes::categories::update_categories)
                .delete(routes::categories::delete_category),
        )
        .route(
            "/api/categories/reorder",
            put(routes::categories::reorder_categories),
        )
        .route(
            "/api/links",
            get(routes::links::list_links)
                .post(routes::links::create_link)
                .put(routes::links::update_links)
                .delete(routes::links::delete_link),
        )
        .route("/api/links/reorder", put(routes::links::reorder_links))
        .route("/api/links/click", post(routes::links::record_click))
        .route(
            "/api/gallery",
            get(routes::gallery::list_images)
                .post(routes::gallery::create_image)
                .put(routes::gallery::update_image)
                .delete(routes::gallery::delete_image),
        )
        .route(
            "/api/about",
            get(routes::about::get_about)
                .put(routes::about::put_about)
                .post(routes::about::create_about),
        )
        .route(
            "/api/config",
            get(routes::config::list_config).put(routes::config::update_config),
        )
        .route("/api/site", get(routes::site::get_site))
        .route("/api/home", get(routes::site::get_home))
        .route(
            "/api/hero",
            get(routes::hero::list_active_slides)
                .post(routes::hero::create_slide)
                .put(routes::hero::update_slides)
                .delete(routes::hero::delete_slide),
        )
        .route("/api/hero/all", get(routes::hero::list_all_slides))
        .route("/api/hero/reorder", put(routes::hero::reorder_slides))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/verify", post(routes::auth::verify))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/password", put(routes::auth::change_password))
        .route("/health", get(routes::health::health))
        .route("/health/ready", get(routes::health::health_ready))
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Global 2 MB request body cap
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(cors)
}

/// In-memory store without a database config, Postgres otherwise. An
/// unreachable database keeps the Postgres store so health reports degraded
/// and writes answer 503 until it comes back.
async fn connect_store(config: Option<db::DbConfig>) -> io::Result<Arc<dyn Store>> {
    let Some(config) = config else {
        tracing::warn!(
            "DATABASE_URL not set. Running with in-memory storage; data is not persisted."
        );
        return Ok(Arc::new(MemoryStore::new()));
    };

    match db::init_pool(Some(config.clone())).await {
        Ok(pool) => {
            if let Err(e) = db::run_migrations(&pool).await {
                tracing::error!("Failed to run database migrations: {}", e);
            }
            Ok(Arc::new(PgStore::new(pool)))
        }
        Err(e) => {
            tracing::error!(
                "Database unreachable at startup: {}. Schema setup is skipped until restart.",
                e
            );
            let pool = db::lazy_pool(&config).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Invalid DATABASE_URL: {}", e),
                )
            })?;
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

async fn warn_on_default_password(store: &dyn Store) {
    match store.list_config().await {
        Ok(entries) if !entries.iter().any(|e| e.key == site_config::ADMIN_PASSWORD_KEY) => {
            tracing::warn!(
                "SECURITY: admin_password is not configured; \
                 the built-in default password is active."
            );
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Could not read site config at startup: {}", e),
    }
}

/// Run the server (used by main).
pub async fn run() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Guards must live as long as the process or buffered log lines are lost
    let _log_guards = logging::init();

    routes::health::init_start_time();

    let sessions = SessionKeys::from_env();
    let environment = std::env::var("ENVIRONMENT").unwrap_or_default();
    if environment == "production" && sessions.uses_default_secret() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "SESSION_SECRET must be set to a secure, unique value in production",
        ));
    }
    if sessions.uses_default_secret() {
        tracing::warn!("SECURITY: SESSION_SECRET is not set; using the development default.");
    }

    let db_config = std::env::var("DATABASE_URL")
        .ok()
        .map(|_| db::DbConfig::default());
    let store = connect_store(db_config).await?;
    if environment == "production" {
        warn_on_default_password(store.as_ref()).await;
    }

    let state = AppState {
        store,
        sessions: Arc::new(sessions),
    };
    let app = create_app(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3001);
    let addr: SocketAddr = format!("{}:{}", host, port).parse().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid HOST/PORT configuration: {}", e),
        )
    })?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
