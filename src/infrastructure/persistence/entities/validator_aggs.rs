//! SeaORM Entity for validator_aggregates table

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "validator_aggregates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub stash_account: String,
    #[sea_orm(column_type = "Text")]
    pub display_name: String,
    pub started_at_height: i64,
    pub started_at: DateTime<Utc>,
    pub recent_at_height: i64,
    pub recent_at: DateTime<Utc>,
    pub accumulated_uptime: i64,
    pub accumulated_uptime_count: i64,
    pub recent_as_validator_height: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
