//! Database layer
//!
//! PostgreSQL connection pooling and schema migrations backing
//! [`crate::store::postgres::PgDocumentStore`].
//!
//! - `pool`: connection pool creation, health check, shutdown
//! - `migrations`: embedded migration runner

pub mod migrations;
pub mod pool;
