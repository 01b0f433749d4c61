use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::egg;
use crate::repository::EggAggregate;

/// Response DTO for a provisioned egg.
#[derive(Serialize, utoipa::ToSchema)]
pub struct EggResponse {
    /// Egg ID (UUIDv7).
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub id: String,
    #[schema(example = "u1")]
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<egg::Model> for EggResponse {
    fn from(model: egg::Model) -> Self {
        Self {
            id: model.id.to_string(),
            user_id: model.user_id,
            created_at: model.created_at,
        }
    }
}

/// Response DTO for an egg's aggregate contents.
#[derive(Serialize, utoipa::ToSchema)]
pub struct EggAggregateResponse {
    pub egg_id: String,
    /// Number of cracks currently linked to the egg.
    #[schema(example = 2)]
    pub count: u64,
    /// Cut-out URLs in insertion order.
    pub segment_urls: Vec<String>,
}

impl From<EggAggregate> for EggAggregateResponse {
    fn from(aggregate: EggAggregate) -> Self {
        Self {
            egg_id: aggregate.egg_id.to_string(),
            count: aggregate.count,
            segment_urls: aggregate.segment_urls,
        }
    }
}

/// Acknowledgement for a user data reset.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ResetResponse {
    /// Number of egg links removed. Zero for a user with no data.
    #[schema(example = 2)]
    pub removed_links: u64,
}
