//! Health check endpoint
//!
//! ```text
//! GET /api/health
//! ```
//!
//! ```json
//! {
//!   "status": "ok",
//!   "timestamp": "2026-01-01T00:00:00Z",
//!   "version": "0.1.0",
//!   "store": "connected",
//!   "backend": "postgres"
//! }
//! ```
//!
//! `status` is always `"ok"` while the process is serving; store
//! reachability is reported separately.

use crate::app::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Server time
    pub timestamp: DateTime<Utc>,

    /// Application version
    pub version: String,

    /// Store reachability: "connected" or "disconnected"
    pub store: String,

    /// Store backend name
    pub backend: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_status = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        version: vibeagent_shared::VERSION.to_string(),
        store: store_status.to_string(),
        backend: state.store.backend().to_string(),
    })
}
