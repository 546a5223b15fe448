//! SeaORM Entity for block_summaries table

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "block_summaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub time_interval: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub time_bucket: DateTime<Utc>,
    pub index_version: i64,
    pub count: i64,
    pub block_time_avg: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
