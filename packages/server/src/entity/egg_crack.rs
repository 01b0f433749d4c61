use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership of a crack in an egg. The composite primary key keeps a
/// crack from being counted twice in the same egg on retried links.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "egg_crack")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub egg_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub crack_id: i32,
    #[sea_orm(belongs_to, from = "egg_id", to = "id")]
    pub egg: BelongsTo<super::egg::Entity>,
    #[sea_orm(belongs_to, from = "crack_id", to = "id")]
    pub crack: BelongsTo<super::crack::Entity>,

    pub linked_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
