use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direct user-to-crack ownership link, kept as an audit trail that
/// survives egg resets.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_crack")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub crack_id: i32,
    #[sea_orm(belongs_to, from = "crack_id", to = "id")]
    pub crack: BelongsTo<super::crack::Entity>,

    pub linked_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
