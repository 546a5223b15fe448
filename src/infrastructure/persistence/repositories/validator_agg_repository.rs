use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::domain::models::{Aggregate, ValidatorAgg};
use crate::infrastructure::persistence::entities::validator_aggs;
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::stores::ValidatorAggStore;

/// Repository for validator aggregate operations
#[derive(Clone)]
pub struct ValidatorAggRepository {
    conn: DatabaseConnection,
}

impl ValidatorAggRepository {
    /// Create a new ValidatorAggRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn to_active_model(agg: &ValidatorAgg) -> validator_aggs::ActiveModel {
        validator_aggs::ActiveModel {
            stash_account: Set(agg.stash_account.clone()),
            display_name: Set(agg.display_name.clone()),
            started_at_height: Set(agg.aggregate.started_at_height),
            started_at: Set(agg.aggregate.started_at),
            recent_at_height: Set(agg.aggregate.recent_at_height),
            recent_at: Set(agg.aggregate.recent_at),
            accumulated_uptime: Set(agg.accumulated_uptime),
            accumulated_uptime_count: Set(agg.accumulated_uptime_count),
            recent_as_validator_height: Set(agg.recent_as_validator_height),
        }
    }
}

impl From<validator_aggs::Model> for ValidatorAgg {
    fn from(model: validator_aggs::Model) -> Self {
        ValidatorAgg {
            aggregate: Aggregate {
                started_at_height: model.started_at_height,
                started_at: model.started_at,
                recent_at_height: model.recent_at_height,
                recent_at: model.recent_at,
            },
            stash_account: model.stash_account,
            display_name: model.display_name,
            accumulated_uptime: model.accumulated_uptime,
            accumulated_uptime_count: model.accumulated_uptime_count,
            recent_as_validator_height: model.recent_as_validator_height,
        }
    }
}

#[async_trait]
impl ValidatorAggStore for ValidatorAggRepository {
    async fn find_by_stash_account(&self, stash: &str) -> Result<Option<ValidatorAgg>, DbError> {
        let result = validator_aggs::Entity::find_by_id(stash.to_string())
            .one(&self.conn)
            .await?;
        Ok(result.map(ValidatorAgg::from))
    }

    async fn create(&self, agg: &ValidatorAgg) -> Result<(), DbError> {
        Self::to_active_model(agg).insert(&self.conn).await?;
        Ok(())
    }

    async fn save(&self, agg: &ValidatorAgg) -> Result<(), DbError> {
        Self::to_active_model(agg).update(&self.conn).await?;
        Ok(())
    }
}
