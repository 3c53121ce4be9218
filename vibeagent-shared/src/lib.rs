//! # Vibeagent Shared Library
//!
//! Types, storage, and domain logic used by the Vibeagent API server.
//!
//! ## Module Organization
//!
//! - `phone`: Phone number normalization (user keys)
//! - `store`: Document store abstraction with Postgres and in-memory backends
//! - `db`: PostgreSQL pool management and migrations
//! - `models`: Typed user, household, job, and request-capture records
//! - `directory`: User detail aggregation (user + households + active jobs)

pub mod db;
pub mod directory;
pub mod models;
pub mod phone;
pub mod store;

/// Current version of the Vibeagent shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
