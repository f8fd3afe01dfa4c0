use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::database::{DatabaseError, DatabaseManager, MemoryStore, PgStore, Store};
use crate::handlers::{comments, follows, groups, posts};
use crate::media::MediaStore;
use crate::middleware::jwt_auth_middleware;

const DEFAULT_LOG_FILTER: &str = "yatube_api=info,tower_http=info";

/// Immutable state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub media: Arc<MediaStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            media: Arc::new(MediaStore::from_config(&config.media)),
            config: Arc::new(config),
        }
    }
}

/// Which storage backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl StoreKind {
    /// `YATUBE_STORE=memory` selects the in-memory backend
    pub fn from_env() -> Self {
        match std::env::var("YATUBE_STORE").as_deref() {
            Ok("memory") => StoreKind::Memory,
            _ => StoreKind::Postgres,
        }
    }
}

/// Open a backend. Postgres connections get the schema applied first.
pub async fn open_store(
    kind: StoreKind,
    config: &AppConfig,
) -> Result<Arc<dyn Store>, DatabaseError> {
    match kind {
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreKind::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::apply_schema(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A second call (tests, CLI subcommands) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected API
        .nest("/api/v1", api_routes(state.clone()))
        .nest_service(&media_mount(&config), ServeDir::new(&config.media.root))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/groups/", get(groups::list))
        .route("/groups/:id/", get(groups::get))
        .route("/posts/", get(posts::list).post(posts::create))
        .route(
            "/posts/:id/",
            get(posts::get)
                .put(posts::put)
                .patch(posts::patch)
                .delete(posts::delete),
        )
        .route(
            "/posts/:post_id/comments/",
            get(comments::list).post(comments::create),
        )
        .route(
            "/posts/:post_id/comments/:id/",
            get(comments::get)
                .put(comments::put)
                .patch(comments::patch)
                .delete(comments::delete),
        )
        .route("/follow/", get(follows::list).post(follows::create))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn media_mount(config: &AppConfig) -> String {
    match config.media.url_prefix.trim_end_matches('/') {
        "" => "/media".to_string(),
        prefix if prefix.starts_with('/') => prefix.to_string(),
        prefix => format!("/{}", prefix),
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Bind and serve until ctrl-c
pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    if state.config.security.jwt_secret.is_empty() {
        tracing::warn!("SECURITY_JWT_SECRET is empty; every /api/v1 request will be rejected");
    }

    tracing::info!(
        "yatube API listening on http://{} ({} store)",
        bind_addr,
        state.store.backend()
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "yatube API",
            "version": version,
            "description": "Blogging API: posts, comments, groups and follows",
            "endpoints": {
                "health": "/health (public)",
                "groups": "/api/v1/groups/[:id/] (read-only)",
                "posts": "/api/v1/posts/[:id/]",
                "comments": "/api/v1/posts/:post_id/comments/[:id/]",
                "follow": "/api/v1/follow/",
                "media": "/media/* (uploaded images)",
            },
            "authentication": "Authorization: Bearer <jwt> on every /api/v1 route",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": state.store.backend()
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
