//! API route handlers
//!
//! Organized by resource:
//!
//! - `health`: Health check endpoint
//! - `users`: User lookup (with households and active jobs) and upserts
//! - `households`: Household CRUD
//! - `jobs`: Job CRUD
//! - `capture`: Diagnostic request capture

pub mod capture;
pub mod health;
pub mod households;
pub mod jobs;
pub mod users;

use crate::error::ApiError;

/// Fallback for unmatched paths and methods
pub async fn endpoint_not_found() -> ApiError {
    ApiError::NotFound("Endpoint not found".to_string())
}
