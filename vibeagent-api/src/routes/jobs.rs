//! Job endpoints
//!
//! - `GET /api/jobs/:id`
//! - `POST /api/jobs` - Create under a generated id (status defaults to `open`)
//! - `PUT /api/jobs/:id` - Create or merge-update

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::JsonBody,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;
use vibeagent_shared::models::{CreateJob, Job, JobStatus, UpdateJob};

/// Error message for a create request lacking required fields
pub const MISSING_REQUIRED_FIELDS: &str =
    "Missing required fields: household_id, user_id, and title are required";

/// Create job request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(
        required(message = "household_id is required"),
        length(min = 1, message = "household_id must not be empty")
    )]
    pub household_id: Option<String>,

    #[validate(
        required(message = "user_id is required"),
        length(min = 1, message = "user_id must not be empty")
    )]
    pub user_id: Option<String>,

    #[validate(
        required(message = "title is required"),
        length(min = 1, message = "title must not be empty")
    )]
    pub title: Option<String>,

    pub category: Option<String>,

    /// Defaults to `open` when absent or empty
    pub status: Option<JobStatus>,
}

impl CreateJobRequest {
    /// Validates required fields and converts into a store payload
    pub fn into_create_job(self) -> ApiResult<CreateJob> {
        self.validate()
            .map_err(|e| ApiError::validation(MISSING_REQUIRED_FIELDS, &e))?;

        match (self.household_id, self.user_id, self.title) {
            (Some(household_id), Some(user_id), Some(title)) => Ok(CreateJob {
                household_id,
                user_id,
                title,
                category: self.category,
                status: self
                    .status
                    .filter(|status| !status.as_str().is_empty())
                    .unwrap_or_default(),
            }),
            _ => Err(ApiError::BadRequest(MISSING_REQUIRED_FIELDS.to_string())),
        }
    }
}

/// Get a job by id
///
/// # Errors
///
/// - `404 Not Found`: No job with this id
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Job>> {
    Job::find_by_id(state.store.as_ref(), &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))
}

/// Create a job
///
/// # Errors
///
/// - `400 Bad Request`: `household_id`, `user_id`, or `title` missing or empty
pub async fn create_job(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateJobRequest>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    let data = req.into_create_job()?;

    let job = Job::create(state.store.as_ref(), data).await?;

    info!(job_id = %job.id, user_id = %job.user_id, "Job created");
    Ok((StatusCode::CREATED, Json(job)))
}

/// Create or merge-update a job
pub async fn upsert_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(changes): JsonBody<UpdateJob>,
) -> ApiResult<Json<Job>> {
    let job = Job::upsert(state.store.as_ref(), &id, changes).await?;

    info!(job_id = %id, "Job upserted");
    Ok(Json(job))
}
