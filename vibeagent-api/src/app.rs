//! Application state and router builder
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vibeagent_api::{app::{build_router, AppState}, config::Config};
//! use vibeagent_shared::store::memory::MemoryStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let state = AppState::new(Arc::new(MemoryStore::new()), Config::default());
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use crate::routes::{self, capture, health, households, jobs, users};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{any, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use vibeagent_shared::store::SharedStore;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Document store client
    pub store: SharedStore,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: SharedStore, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── /api/
/// │   ├── GET        /health
/// │   ├── POST       /users
/// │   ├── GET|PUT    /users/:phone
/// │   ├── POST       /households
/// │   ├── GET|PUT    /households/:id
/// │   ├── POST       /jobs
/// │   └── GET|PUT    /jobs/:id
/// └── ANY /test      # request capture (optional)
/// ```
///
/// Anything else, including a known path with an unsupported method,
/// answers `404 {"error": "Endpoint not found"}`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/health",
            get(health::health_check).fallback(routes::endpoint_not_found),
        )
        .route(
            "/users",
            post(users::create_user).fallback(routes::endpoint_not_found),
        )
        .route(
            "/users/:phone",
            get(users::get_user)
                .put(users::upsert_user)
                .fallback(routes::endpoint_not_found),
        )
        .route(
            "/households",
            post(households::create_household).fallback(routes::endpoint_not_found),
        )
        .route(
            "/households/:id",
            get(households::get_household)
                .put(households::upsert_household)
                .fallback(routes::endpoint_not_found),
        )
        .route(
            "/jobs",
            post(jobs::create_job).fallback(routes::endpoint_not_found),
        )
        .route(
            "/jobs/:id",
            get(jobs::get_job)
                .put(jobs::upsert_job)
                .fallback(routes::endpoint_not_found),
        );

    let mut router = Router::new().nest("/api", api_routes);

    if state.config.api.request_capture {
        router = router.route("/test", any(capture::capture_request));
    }

    router
        .fallback(routes::endpoint_not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
