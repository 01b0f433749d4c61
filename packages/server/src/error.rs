use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::inference::InferenceError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `INPUT_ERROR`, `NOT_FOUND`, `CONFLICT`, `INFERENCE_ERROR`,
    /// `STORAGE_ERROR`, `PERSISTENCE_ERROR`, `INTERNAL_ERROR`.
    #[schema(example = "INPUT_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Image could not be decoded")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// Malformed request payload.
    Validation(String),
    /// Unreadable or undecodable source image, or out-of-range coordinates.
    Input(String),
    /// Referenced record (typically the user's egg) does not exist.
    NotFound(String),
    Conflict(String),
    /// A model capability failed or timed out.
    Inference(InferenceError),
    /// A blob storage step failed.
    Storage(StorageError),
    /// A database step failed.
    Persistence(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::Input(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "INPUT_ERROR",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::Inference(err) => {
                tracing::error!("Inference capability failed: {}", err);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        code: "INFERENCE_ERROR",
                        message: "Model inference failed or timed out".into(),
                    },
                )
            }
            AppError::Storage(err) => {
                tracing::error!("Blob storage step failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "STORAGE_ERROR",
                        message: "Failed to store the segment artifact".into(),
                    },
                )
            }
            AppError::Persistence(detail) => {
                tracing::error!("Persistence step failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "PERSISTENCE_ERROR",
                        message: "Failed to record the finding".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::Inference(err)
    }
}
