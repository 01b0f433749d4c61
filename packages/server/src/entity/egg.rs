use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "egg")]
pub struct Model {
    /// UUIDv7 primary key, assigned at provisioning time.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning user (external identity, opaque string).
    /// The unique index is what enforces one active egg per user.
    #[sea_orm(unique)]
    pub user_id: String,

    #[sea_orm(has_many)]
    pub egg_cracks: HasMany<super::egg_crack::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
