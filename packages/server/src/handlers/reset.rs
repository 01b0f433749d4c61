use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::egg::ResetResponse;
use crate::models::shared::validate_user_id;
use crate::state::AppState;

#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/cracks",
    tag = "Eggs",
    operation_id = "resetUserCracks",
    summary = "Reset a user's collection",
    description = "Removes every crack link from the user's egg. Crack records and stored \
        cut-outs are retained as audit trail. A user with no egg or no links succeeds with \
        zero removals.",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Reset acknowledged", body = ResetResponse),
        (status = 400, description = "Invalid user id (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(user_id))]
pub async fn reset_user_cracks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ResetResponse>, AppError> {
    validate_user_id(&user_id)?;

    let removed_links = state.repository.delete_user_data(&user_id).await?;
    Ok(Json(ResetResponse { removed_links }))
}
