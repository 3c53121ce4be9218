//! Document store abstraction
//!
//! All persistent state lives in a key-addressed JSON document store with
//! three operations on single documents (get, set, add) and one filtered
//! read (query). Handlers never talk to a database directly; they receive an
//! explicitly constructed [`SharedStore`] through application state.
//!
//! # Backends
//!
//! - [`postgres::PgDocumentStore`]: one JSONB row per document in the
//!   `documents` table
//! - [`memory::MemoryStore`]: process-local map, used by tests and local runs
//!
//! # Server timestamps
//!
//! Callers never supply `created_at` / `updated_at` values. A
//! [`DocumentWrite`] carries the *names* of fields that the store must fill
//! with its own clock at write time:
//!
//! ```
//! use serde_json::json;
//! use vibeagent_shared::store::{DocumentWrite, CREATED_AT, UPDATED_AT};
//!
//! let write = DocumentWrite::from_value(json!({ "title": "Fix sink" }))
//!     .unwrap()
//!     .stamp(UPDATED_AT)
//!     .stamp_on_insert(CREATED_AT);
//!
//! assert_eq!(write.stamped_fields(), [UPDATED_AT]);
//! ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, sync::Arc};
use thiserror::Error;
use uuid::Uuid;

/// Field stamped with the server time when a document is first written
pub const CREATED_AT: &str = "created_at";

/// Field stamped with the server time on every write
pub const UPDATED_AT: &str = "updated_at";

/// JSON object body of a document
pub type Fields = Map<String, Value>;

/// Store handle shared across request handlers
pub type SharedStore = Arc<dyn DocumentStore>;

/// Document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Users keyed by normalized phone number
    Users,

    /// Households keyed by opaque id
    Households,

    /// Jobs keyed by opaque id
    Jobs,

    /// Captured diagnostic requests
    RequestCaptures,
}

impl Collection {
    /// Collection name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Households => "households",
            Collection::Jobs => "jobs",
            Collection::RequestCaptures => "tests",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Write body was not a JSON object
    #[error("document body must be a JSON object")]
    NotAnObject,

    /// Record could not be converted to a document body
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    /// Stored document does not match the expected record shape
    #[error("document {collection}/{id} could not be decoded: {source}")]
    Decode {
        collection: Collection,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A document as read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Collection the document lives in
    pub collection: Collection,

    /// Document key
    pub id: String,

    /// Document body (never contains the key)
    pub data: Fields,
}

impl Document {
    /// Decodes the document into a typed record.
    ///
    /// The key is exposed to the record as an `id` field.
    pub fn into_record<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let Document {
            collection,
            id,
            mut data,
        } = self;
        data.insert("id".to_string(), Value::String(id.clone()));

        serde_json::from_value(Value::Object(data)).map_err(|source| StoreError::Decode {
            collection,
            id,
            source,
        })
    }
}

/// How `set` treats an existing document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMode {
    /// Replace the whole document
    Overwrite,

    /// Overwrite supplied top-level fields, keep the rest
    Merge,
}

/// Body of a write plus the server-timestamp instructions that go with it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentWrite {
    fields: Fields,
    stamp: Vec<String>,
    stamp_on_insert: Vec<String>,
}

impl DocumentWrite {
    /// Creates a write from an already-built field map
    pub fn new(fields: Fields) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    /// Creates a write from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Object(fields) => Ok(Self::new(fields)),
            _ => Err(StoreError::NotAnObject),
        }
    }

    /// Creates a write from any serializable record
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self, StoreError> {
        let value = serde_json::to_value(record).map_err(StoreError::Encode)?;
        Self::from_value(value)
    }

    /// Sets a single field, replacing any previous value
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Stamps `name` with the server time on every write
    pub fn stamp(mut self, name: &str) -> Self {
        self.fields.remove(name);
        self.stamp.push(name.to_string());
        self
    }

    /// Stamps `name` with the server time only when the write creates the
    /// document (or replaces it outright)
    pub fn stamp_on_insert(mut self, name: &str) -> Self {
        self.fields.remove(name);
        self.stamp_on_insert.push(name.to_string());
        self
    }

    /// Caller-supplied fields
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Fields stamped on every write
    pub fn stamped_fields(&self) -> &[String] {
        &self.stamp
    }

    /// Fields stamped only on insert
    pub fn insert_stamped_fields(&self) -> &[String] {
        &self.stamp_on_insert
    }

    /// Resolves the write into concrete fields for the given server time.
    pub fn resolve(&self, now: DateTime<Utc>, inserting: bool) -> Fields {
        let timestamp = Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true));
        let mut fields = self.fields.clone();

        for name in &self.stamp {
            fields.insert(name.clone(), timestamp.clone());
        }
        if inserting {
            for name in &self.stamp_on_insert {
                fields.insert(name.clone(), timestamp.clone());
            }
        }

        fields
    }
}

/// Query predicate on a top-level field
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value
    Eq { field: String, value: Value },

    /// Field equals one of the values
    In { field: String, values: Vec<Value> },
}

impl Filter {
    /// `field == value`
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// `field in values`
    pub fn one_of<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Evaluates the predicate against a document body
    pub fn matches(&self, data: &Fields) -> bool {
        match self {
            Filter::Eq { field, value } => data.get(field) == Some(value),
            Filter::In { field, values } => data
                .get(field)
                .is_some_and(|actual| values.iter().any(|v| v == actual)),
        }
    }
}

/// Key-addressed JSON document store
///
/// Every operation is atomic per document; there are no multi-document
/// transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Reads a document by key
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    /// Writes a document under a caller-chosen key, creating it if absent
    async fn set(
        &self,
        collection: Collection,
        id: &str,
        write: DocumentWrite,
        mode: SetMode,
    ) -> Result<Document, StoreError>;

    /// Creates a document under a generated key
    async fn add(&self, collection: Collection, write: DocumentWrite) -> Result<Document, StoreError>;

    /// Returns all documents matching every filter, in insertion order
    async fn query(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<Document>, StoreError>;

    /// Verifies the backend is reachable
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Generates an opaque document key
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::Users.as_str(), "users");
        assert_eq!(Collection::Households.as_str(), "households");
        assert_eq!(Collection::Jobs.as_str(), "jobs");
        assert_eq!(Collection::RequestCaptures.to_string(), "tests");
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(matches!(
            DocumentWrite::from_value(json!(["a"])),
            Err(StoreError::NotAnObject)
        ));
    }

    #[test]
    fn test_resolve_stamps() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let write = DocumentWrite::from_value(json!({ "name": "Ada", "updated_at": "client" }))
            .unwrap()
            .stamp(UPDATED_AT)
            .stamp_on_insert(CREATED_AT);

        let inserted = write.resolve(now, true);
        assert_eq!(inserted["name"], "Ada");
        assert_eq!(inserted[UPDATED_AT], "2026-01-02T03:04:05.000000Z");
        assert_eq!(inserted[CREATED_AT], "2026-01-02T03:04:05.000000Z");

        let merged = write.resolve(now, false);
        assert_eq!(merged[UPDATED_AT], "2026-01-02T03:04:05.000000Z");
        assert!(!merged.contains_key(CREATED_AT));
    }

    #[test]
    fn test_filter_matching() {
        let data = fields(json!({ "user_id": "+11234567890", "status": "open" }));

        assert!(Filter::eq("user_id", "+11234567890").matches(&data));
        assert!(!Filter::eq("user_id", "+19999999999").matches(&data));
        assert!(Filter::one_of("status", ["open", "in_progress"]).matches(&data));
        assert!(!Filter::one_of("status", ["completed"]).matches(&data));
        assert!(!Filter::eq("missing", "x").matches(&data));
    }

    #[test]
    fn test_into_record_exposes_key_as_id() {
        #[derive(Deserialize)]
        struct Named {
            id: String,
            name: String,
        }

        let doc = Document {
            collection: Collection::Households,
            id: "house1".to_string(),
            data: fields(json!({ "name": "Home" })),
        };
        let record: Named = doc.into_record().unwrap();
        assert_eq!(record.id, "house1");
        assert_eq!(record.name, "Home");
    }

    #[test]
    fn test_into_record_reports_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            count: u32,
        }

        let doc = Document {
            collection: Collection::Jobs,
            id: "job1".to_string(),
            data: fields(json!({ "count": "many" })),
        };
        let err = doc.into_record::<Strict>().unwrap_err();
        assert!(err.to_string().starts_with("document jobs/job1 could not be decoded"));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
        assert_eq!(generate_id().len(), 32);
    }
}
