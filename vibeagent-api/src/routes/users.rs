//! User endpoints
//!
//! - `GET /api/users/:phone` - User with households and active jobs
//! - `POST /api/users` - Create (or replace) a user
//! - `PUT /api/users/:phone` - Create or merge-update a user
//!
//! Phone numbers in paths and bodies are normalized before use, so
//! `/api/users/(123)%20456-7890` and `/api/users/+11234567890` address the
//! same user.

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
use vibeagent_shared::{
    directory::{self, UserDetail},
    models::{CreateUser, UpdateUser, User},
    phone::{self, PhoneError},
};

/// Create user request
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    /// Phone number in any common format
    pub phone: Option<String>,

    pub name: Option<String>,

    pub email: Option<String>,

    #[serde(default)]
    pub household_ids: Vec<String>,
}

/// Get a user with its households and active jobs
///
/// # Errors
///
/// - `400 Bad Request`: Phone number has no digits
/// - `404 Not Found`: No user with this phone number
pub async fn get_user(
    State(state): State<AppState>,
    Path(raw_phone): Path<String>,
) -> ApiResult<Json<UserDetail>> {
    let detail = directory::get_user_detail(state.store.as_ref(), &raw_phone).await?;
    Ok(Json(detail))
}

/// Create a user keyed by its normalized phone number
///
/// An existing user with the same phone number is replaced.
///
/// # Errors
///
/// - `400 Bad Request`: Phone number missing or invalid
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let phone = phone::normalize_opt(req.phone.as_deref()).map_err(|e| match e {
        PhoneError::Empty => ApiError::BadRequest("Phone number is required".to_string()),
        PhoneError::NoDigits(_) => ApiError::BadRequest("Invalid phone number".to_string()),
    })?;

    let user = User::create(
        state.store.as_ref(),
        CreateUser {
            phone,
            name: req.name,
            email: req.email,
            household_ids: req.household_ids,
        },
    )
    .await?;

    info!(phone = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Create or merge-update a user
///
/// Fields omitted from the body keep their stored values. A `phone` field
/// in the body is ignored; the path decides the key.
///
/// # Errors
///
/// - `400 Bad Request`: Phone number invalid or body malformed
pub async fn upsert_user(
    State(state): State<AppState>,
    Path(raw_phone): Path<String>,
    JsonBody(changes): JsonBody<UpdateUser>,
) -> ApiResult<Json<User>> {
    let phone = phone::normalize(&raw_phone)
        .map_err(|_| ApiError::BadRequest("Invalid phone number".to_string()))?;

    let user = User::upsert(state.store.as_ref(), &phone, changes).await?;

    info!(%phone, "User upserted");
    Ok(Json(user))
}
