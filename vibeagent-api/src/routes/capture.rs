//! Diagnostic request capture
//!
//! `ANY /test` stores the method, URL, query parameters, headers, and body
//! of the incoming request in the `tests` collection and echoes the stored
//! record back. Mounted only when `REQUEST_CAPTURE_ENABLED` is on.

use crate::{app::AppState, error::ApiResult};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, Uri},
    Json,
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;
use vibeagent_shared::models::{NewRequestCapture, RequestCapture};

/// Record the incoming request
pub async fn capture_request(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Query(query_params): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<RequestCapture>> {
    let capture = RequestCapture::record(
        state.store.as_ref(),
        NewRequestCapture {
            method: method.to_string(),
            url: uri.to_string(),
            query_params,
            headers: header_map(&headers),
            body: body_value(&body),
        },
    )
    .await?;

    info!(capture_id = %capture.id, method = %capture.method, "Request captured");
    Ok(Json(capture))
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

/// JSON bodies are stored parsed, anything else as text
fn body_value(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }

    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
