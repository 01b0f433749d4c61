use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::imaging;
use crate::models::analyze::{AnalyzeRequest, AnalyzeResponse, validate_analyze_request};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/analyses",
    tag = "Analyses",
    operation_id = "analyze",
    summary = "Analyze a crack photo",
    description = "Runs the submitted photo through segmentation and classification, stores the \
        thresholded cut-out, registers the finding in the user's egg and returns the updated \
        aggregate. A photo without a detectable crack answers `status: \"none\"` with null fields.",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis result", body = AnalyzeResponse),
        (status = 400, description = "Bad payload or unusable image (VALIDATION_ERROR, INPUT_ERROR)", body = ErrorBody),
        (status = 404, description = "User has no active egg (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Model capability failed (INFERENCE_ERROR)", body = ErrorBody),
        (status = 500, description = "Storage or persistence failure (STORAGE_ERROR, PERSISTENCE_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(user_id = %payload.user_id))]
pub async fn analyze(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    validate_analyze_request(&payload)?;

    let image_bytes = imaging::fetch_image_bytes(&state.http, &payload.image_ref).await?;

    let outcome = state
        .pipeline
        .analyze(
            &payload.user_id,
            &payload.image_ref,
            &image_bytes,
            payload.latitude,
            payload.longitude,
        )
        .await?;

    Ok(Json(AnalyzeResponse::from(outcome)))
}
