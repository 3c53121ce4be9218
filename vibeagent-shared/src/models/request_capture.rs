//! Captured diagnostic requests
//!
//! The `/test` endpoint stores a snapshot of each request it receives so
//! client integrations can be debugged from the database.

use crate::store::{Collection, DocumentStore, DocumentWrite, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field stamped with the server time when a capture is stored
pub const CAPTURED_AT: &str = "timestamp";

/// A stored request snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCapture {
    pub id: String,
    pub method: String,
    pub url: String,

    #[serde(default)]
    pub query_params: BTreeMap<String, String>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Parsed JSON body, a string for non-JSON bodies, or null when empty
    #[serde(default)]
    pub body: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Input for recording a request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequestCapture {
    pub method: String,
    pub url: String,
    pub query_params: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl RequestCapture {
    /// Stores a request snapshot under a generated id
    pub async fn record(store: &dyn DocumentStore, data: NewRequestCapture) -> Result<Self, StoreError> {
        let write = DocumentWrite::from_record(&data)?.stamp(CAPTURED_AT);

        store
            .add(Collection::RequestCaptures, write)
            .await?
            .into_record()
    }
}
