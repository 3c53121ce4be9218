//! PostgreSQL document store
//!
//! Each document is one row of the `documents` table:
//!
//! ```sql
//! CREATE TABLE documents (
//!     seq BIGSERIAL NOT NULL,
//!     collection TEXT NOT NULL,
//!     id TEXT NOT NULL,
//!     data JSONB NOT NULL DEFAULT '{}'::jsonb,
//!     PRIMARY KEY (collection, id)
//! );
//! ```
//!
//! Merges use the JSONB concatenation operator, so the read-modify-write of
//! an upsert happens inside a single `INSERT ... ON CONFLICT` statement.
//! Server timestamps come from the database clock (`now()`), never from the
//! API process.

use super::{
    generate_id, Collection, Document, DocumentStore, DocumentWrite, Filter, SetMode, StoreError,
};
use crate::db::pool;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

const INSERT_OR_REPLACE: &str = r#"
    INSERT INTO documents (collection, id, data)
    VALUES (
        $1,
        $2,
        $3::jsonb
            || (SELECT COALESCE(jsonb_object_agg(f, to_jsonb(now())), '{}'::jsonb) FROM unnest($4::text[]) AS f)
            || (SELECT COALESCE(jsonb_object_agg(f, to_jsonb(now())), '{}'::jsonb) FROM unnest($5::text[]) AS f)
    )
    ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data
    RETURNING id, data
"#;

const INSERT_OR_MERGE: &str = r#"
    INSERT INTO documents (collection, id, data)
    VALUES (
        $1,
        $2,
        $3::jsonb
            || (SELECT COALESCE(jsonb_object_agg(f, to_jsonb(now())), '{}'::jsonb) FROM unnest($4::text[]) AS f)
            || (SELECT COALESCE(jsonb_object_agg(f, to_jsonb(now())), '{}'::jsonb) FROM unnest($5::text[]) AS f)
    )
    ON CONFLICT (collection, id) DO UPDATE SET data = documents.data
        || $3::jsonb
        || (SELECT COALESCE(jsonb_object_agg(f, to_jsonb(now())), '{}'::jsonb) FROM unnest($4::text[]) AS f)
    RETURNING id, data
"#;

const INSERT_NEW: &str = r#"
    INSERT INTO documents (collection, id, data)
    VALUES (
        $1,
        $2,
        $3::jsonb
            || (SELECT COALESCE(jsonb_object_agg(f, to_jsonb(now())), '{}'::jsonb) FROM unnest($4::text[]) AS f)
            || (SELECT COALESCE(jsonb_object_agg(f, to_jsonb(now())), '{}'::jsonb) FROM unnest($5::text[]) AS f)
    )
    RETURNING id, data
"#;

/// Document store backed by a Postgres JSONB table
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn write(
        &self,
        sql: &'static str,
        collection: Collection,
        id: &str,
        write: DocumentWrite,
    ) -> Result<Document, StoreError> {
        let row: (String, JsonValue) = sqlx::query_as(sql)
            .bind(collection.as_str())
            .bind(id)
            .bind(JsonValue::Object(write.fields().clone()))
            .bind(write.stamped_fields())
            .bind(write.insert_stamped_fields())
            .fetch_one(&self.pool)
            .await?;

        into_document(collection, row)
    }
}

fn into_document(collection: Collection, (id, data): (String, JsonValue)) -> Result<Document, StoreError> {
    match data {
        JsonValue::Object(data) => Ok(Document {
            collection,
            id,
            data,
        }),
        _ => Err(StoreError::NotAnObject),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let row: Option<(String, JsonValue)> =
            sqlx::query_as("SELECT id, data FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection.as_str())
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|row| into_document(collection, row)).transpose()
    }

    async fn set(
        &self,
        collection: Collection,
        id: &str,
        write: DocumentWrite,
        mode: SetMode,
    ) -> Result<Document, StoreError> {
        let sql = match mode {
            SetMode::Overwrite => INSERT_OR_REPLACE,
            SetMode::Merge => INSERT_OR_MERGE,
        };

        let doc = self.write(sql, collection, id, write).await?;
        debug!(%collection, id, ?mode, "Document written");
        Ok(doc)
    }

    async fn add(&self, collection: Collection, write: DocumentWrite) -> Result<Document, StoreError> {
        let id = generate_id();
        let doc = self.write(INSERT_NEW, collection, &id, write).await?;
        debug!(%collection, %id, "Document added");
        Ok(doc)
    }

    async fn query(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<Document>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT id, data FROM documents WHERE collection = ");
        builder.push_bind(collection.as_str());

        for filter in filters {
            match filter {
                Filter::Eq { field, value } => {
                    builder.push(" AND data -> ");
                    builder.push_bind(field.clone());
                    builder.push("::text = ");
                    builder.push_bind(value.clone());
                    builder.push("::jsonb");
                }
                Filter::In { field, values } => {
                    builder.push(" AND data -> ");
                    builder.push_bind(field.clone());
                    builder.push("::text IN (SELECT jsonb_array_elements(");
                    builder.push_bind(JsonValue::Array(values.clone()));
                    builder.push("::jsonb))");
                }
            }
        }
        builder.push(" ORDER BY seq");

        let rows: Vec<(String, JsonValue)> = builder.build_query_as().fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|row| into_document(collection, row))
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        pool::health_check(&self.pool).await?;
        Ok(())
    }
}
