use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An immutable crack finding. Rows are never updated and only removed
/// wholesale through administrative cleanup, never by the reset path.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crack")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Source photo reference exactly as submitted (URL or path).
    pub img_url: String,

    /// Public URL of the stored cut-out PNG.
    pub seg_url: String,

    /// One of: Other, Linear, Alligator, Pothole.
    pub crack_type: String,

    /// Ordinal severity, 0 (negligible) to 3 (severe).
    pub severity: i16,

    /// WGS84 degrees.
    pub latitude: f64,
    pub longitude: f64,

    #[sea_orm(has_many)]
    pub egg_cracks: HasMany<super::egg_crack::Entity>,

    #[sea_orm(has_many)]
    pub user_cracks: HasMany<super::user_crack::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
