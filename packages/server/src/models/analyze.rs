use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::shared::{validate_coordinates, validate_image_ref, validate_user_id};
use crate::pipeline::AnalysisOutcome;

/// Request body for submitting a photo for analysis.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AnalyzeRequest {
    /// Opaque user identity.
    #[schema(example = "u1")]
    pub user_id: String,
    /// Photo reference: an http(s) URL or a server-local path.
    #[schema(example = "https://example.com/photos/road-42.jpg")]
    pub image_ref: String,
    /// WGS84 degrees.
    #[schema(example = 35.0)]
    pub latitude: f64,
    #[schema(example = 139.0)]
    pub longitude: f64,
}

pub fn validate_analyze_request(payload: &AnalyzeRequest) -> Result<(), AppError> {
    validate_user_id(&payload.user_id)?;
    validate_image_ref(&payload.image_ref)?;
    validate_coordinates(payload.latitude, payload.longitude)
}

/// The egg contents returned alongside a registered finding.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AggregatePayload {
    /// Number of cracks currently in the egg.
    #[schema(example = 3)]
    pub count: u64,
    /// Cut-out URLs in insertion order.
    pub segment_urls: Vec<String>,
}

/// Response for an analysis. A photo with no detectable crack is a
/// success with `status: "none"` and null fields, not an error.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AnalyzeResponse {
    /// `detected` or `none`.
    #[schema(example = "detected")]
    pub status: &'static str,
    pub segment_url: Option<String>,
    /// One of: Linear, Alligator, Pothole.
    #[schema(example = "Linear")]
    pub crack_type: Option<String>,
    /// Ordinal severity, 0-3.
    #[schema(example = 1)]
    pub severity: Option<u8>,
    pub aggregate: Option<AggregatePayload>,
}

impl From<AnalysisOutcome> for AnalyzeResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::NoDefect => Self {
                status: "none",
                segment_url: None,
                crack_type: None,
                severity: None,
                aggregate: None,
            },
            AnalysisOutcome::Registered {
                segment_url,
                crack_type,
                severity,
                segment_urls,
            } => Self {
                status: "detected",
                segment_url: Some(segment_url),
                crack_type: Some(crack_type.as_str().to_string()),
                severity: Some(severity.value()),
                aggregate: Some(AggregatePayload {
                    count: segment_urls.len() as u64,
                    segment_urls,
                }),
            },
        }
    }
}
