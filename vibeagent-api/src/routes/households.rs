//! Household endpoints
//!
//! - `GET /api/households/:id`
//! - `POST /api/households` - Create under a generated id
//! - `PUT /api/households/:id` - Create or merge-update

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
use tracing::info;
use vibeagent_shared::models::{CreateHousehold, Household, UpdateHousehold};

/// Get a household by id
///
/// # Errors
///
/// - `404 Not Found`: No household with this id
pub async fn get_household(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Household>> {
    Household::find_by_id(state.store.as_ref(), &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Household not found".to_string()))
}

/// Create a household
pub async fn create_household(
    State(state): State<AppState>,
    JsonBody(data): JsonBody<CreateHousehold>,
) -> ApiResult<(StatusCode, Json<Household>)> {
    let household = Household::create(state.store.as_ref(), data).await?;

    info!(household_id = %household.id, "Household created");
    Ok((StatusCode::CREATED, Json(household)))
}

/// Create or merge-update a household
pub async fn upsert_household(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(changes): JsonBody<UpdateHousehold>,
) -> ApiResult<Json<Household>> {
    let household = Household::upsert(state.store.as_ref(), &id, changes).await?;

    info!(household_id = %id, "Household upserted");
    Ok(Json(household))
}
