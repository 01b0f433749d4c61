use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::egg::{EggAggregateResponse, EggResponse};
use crate::models::shared::validate_user_id;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/egg",
    tag = "Eggs",
    operation_id = "provisionEgg",
    summary = "Provision a user's egg",
    description = "Creates the user's collection egg. Each user has exactly one active egg; \
        provisioning twice is a conflict.",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 201, description = "Egg created", body = EggResponse),
        (status = 400, description = "Invalid user id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Egg already exists (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(user_id))]
pub async fn provision_egg(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validate_user_id(&user_id)?;

    let egg = state.repository.provision_egg(&user_id).await?;
    Ok((StatusCode::CREATED, Json(EggResponse::from(egg))))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/egg",
    tag = "Eggs",
    operation_id = "getEgg",
    summary = "Get a user's egg aggregate",
    description = "Returns the egg id, the crack count and the cut-out URLs in insertion order.",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Egg aggregate", body = EggAggregateResponse),
        (status = 400, description = "Invalid user id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "User has no active egg (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(user_id))]
pub async fn get_egg(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<EggAggregateResponse>, AppError> {
    validate_user_id(&user_id)?;

    let aggregate = state.repository.aggregate(&user_id).await?;
    Ok(Json(EggAggregateResponse::from(aggregate)))
}
