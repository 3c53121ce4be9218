//! Common test utilities for integration tests
//!
//! Builds the full router (same middleware as production) on top of an
//! in-memory document store and provides a small JSON request helper.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::Service as _;
use vibeagent_api::{
    app::{build_router, AppState},
    config::Config,
};
use vibeagent_shared::store::{memory::MemoryStore, SharedStore};

pub const TEST_PHONE: &str = "+11234567890";

/// Test context containing the app and its backing store
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
}

impl TestContext {
    /// Creates a context with default configuration
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a context with a custom configuration
    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let app = build_router(AppState::new(store.clone(), config));
        Self { store, app }
    }

    /// Sends a request and returns the status and parsed JSON body
    /// (`Value::Null` for an empty body)
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.app, method, uri, body).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(body)).await
    }
}

/// Builds a router over an arbitrary store
pub fn app_with_store(store: SharedStore) -> Router {
    build_router(AppState::new(store, Config::default()))
}

/// Sends a JSON request through a router
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().call(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!(
                "Expected JSON body, got {}: {}",
                status,
                String::from_utf8_lossy(&bytes)
            )
        })
    };

    (status, json)
}
