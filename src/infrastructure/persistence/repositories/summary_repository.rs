//! Repositories for hourly and daily summaries

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::domain::models::summary::activity_periods;
use crate::domain::models::{ActivityPeriod, BlockSummary, SummaryInterval, ValidatorSummary};
use crate::infrastructure::persistence::entities::{block_summaries, validator_summaries};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::stores::{BlockSummaryStore, ValidatorSummaryStore};

/// Repository for block summary operations
#[derive(Clone)]
pub struct BlockSummaryRepository {
    conn: DatabaseConnection,
}

impl BlockSummaryRepository {
    /// Create a new BlockSummaryRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

impl TryFrom<block_summaries::Model> for BlockSummary {
    type Error = DbError;

    fn try_from(model: block_summaries::Model) -> Result<Self, Self::Error> {
        Ok(BlockSummary {
            time_interval: model.time_interval.parse().map_err(DbError::DecodeError)?,
            time_bucket: model.time_bucket,
            index_version: model.index_version,
            count: model.count,
            block_time_avg: model.block_time_avg,
        })
    }
}

#[async_trait]
impl BlockSummaryStore for BlockSummaryRepository {
    async fn find_most_recent_by_interval(
        &self,
        interval: SummaryInterval,
    ) -> Result<Option<BlockSummary>, DbError> {
        let result = block_summaries::Entity::find()
            .filter(block_summaries::Column::TimeInterval.eq(interval.as_str()))
            .order_by_desc(block_summaries::Column::TimeBucket)
            .one(&self.conn)
            .await?;

        result.map(BlockSummary::try_from).transpose()
    }

    async fn find_activity_periods(
        &self,
        interval: SummaryInterval,
        index_version: i64,
    ) -> Result<Vec<ActivityPeriod>, DbError> {
        let buckets: Vec<DateTime<Utc>> = block_summaries::Entity::find()
            .select_only()
            .column(block_summaries::Column::TimeBucket)
            .filter(block_summaries::Column::TimeInterval.eq(interval.as_str()))
            .filter(block_summaries::Column::IndexVersion.eq(index_version))
            .order_by_asc(block_summaries::Column::TimeBucket)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(activity_periods(&buckets, interval))
    }

    async fn upsert(&self, summary: &BlockSummary) -> Result<(), DbError> {
        let model = block_summaries::ActiveModel {
            time_interval: Set(summary.time_interval.as_str().to_string()),
            time_bucket: Set(summary.time_bucket),
            index_version: Set(summary.index_version),
            count: Set(summary.count),
            block_time_avg: Set(summary.block_time_avg),
        };

        block_summaries::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    block_summaries::Column::TimeInterval,
                    block_summaries::Column::TimeBucket,
                ])
                .update_columns([
                    block_summaries::Column::IndexVersion,
                    block_summaries::Column::Count,
                    block_summaries::Column::BlockTimeAvg,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    async fn delete_older_than(
        &self,
        interval: SummaryInterval,
        threshold: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        let result = block_summaries::Entity::delete_many()
            .filter(block_summaries::Column::TimeInterval.eq(interval.as_str()))
            .filter(block_summaries::Column::TimeBucket.lt(threshold))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}

/// Repository for validator summary operations
#[derive(Clone)]
pub struct ValidatorSummaryRepository {
    conn: DatabaseConnection,
}

impl ValidatorSummaryRepository {
    /// Create a new ValidatorSummaryRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

impl TryFrom<validator_summaries::Model> for ValidatorSummary {
    type Error = DbError;

    fn try_from(model: validator_summaries::Model) -> Result<Self, Self::Error> {
        Ok(ValidatorSummary {
            time_interval: model.time_interval.parse().map_err(DbError::DecodeError)?,
            time_bucket: model.time_bucket,
            index_version: model.index_version,
            stash_account: model.stash_account,
            uptime_avg: model.uptime_avg,
            uptime_max: model.uptime_max,
            uptime_min: model.uptime_min,
        })
    }
}

#[async_trait]
impl ValidatorSummaryStore for ValidatorSummaryRepository {
    async fn find_most_recent(&self) -> Result<Option<ValidatorSummary>, DbError> {
        let result = validator_summaries::Entity::find()
            .order_by_desc(validator_summaries::Column::TimeBucket)
            .one(&self.conn)
            .await?;

        result.map(ValidatorSummary::try_from).transpose()
    }

    async fn find_most_recent_by_interval(
        &self,
        interval: SummaryInterval,
    ) -> Result<Option<ValidatorSummary>, DbError> {
        let result = validator_summaries::Entity::find()
            .filter(validator_summaries::Column::TimeInterval.eq(interval.as_str()))
            .order_by_desc(validator_summaries::Column::TimeBucket)
            .one(&self.conn)
            .await?;

        result.map(ValidatorSummary::try_from).transpose()
    }

    async fn upsert(&self, summary: &ValidatorSummary) -> Result<(), DbError> {
        let model = validator_summaries::ActiveModel {
            time_interval: Set(summary.time_interval.as_str().to_string()),
            time_bucket: Set(summary.time_bucket),
            stash_account: Set(summary.stash_account.clone()),
            index_version: Set(summary.index_version),
            uptime_avg: Set(summary.uptime_avg),
            uptime_max: Set(summary.uptime_max),
            uptime_min: Set(summary.uptime_min),
        };

        validator_summaries::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    validator_summaries::Column::TimeInterval,
                    validator_summaries::Column::TimeBucket,
                    validator_summaries::Column::StashAccount,
                ])
                .update_columns([
                    validator_summaries::Column::IndexVersion,
                    validator_summaries::Column::UptimeAvg,
                    validator_summaries::Column::UptimeMax,
                    validator_summaries::Column::UptimeMin,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    async fn delete_older_than(
        &self,
        interval: SummaryInterval,
        threshold: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        let result = validator_summaries::Entity::delete_many()
            .filter(validator_summaries::Column::TimeInterval.eq(interval.as_str()))
            .filter(validator_summaries::Column::TimeBucket.lt(threshold))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}
