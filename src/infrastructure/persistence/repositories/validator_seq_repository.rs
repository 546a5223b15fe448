//! Repositories for the per-session, per-era and per-height validator sequences

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::domain::models::{Sequence, ValidatorEraSeq, ValidatorSeq, ValidatorSessionSeq};
use crate::infrastructure::persistence::entities::{
    validator_era_seqs, validator_seqs, validator_session_seqs,
};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::stores::{
    ValidatorEraSeqStore, ValidatorSeqStore, ValidatorSessionSeqStore,
};

/// Repository for validator session sequence operations
#[derive(Clone)]
pub struct ValidatorSessionSeqRepository {
    conn: DatabaseConnection,
}

impl ValidatorSessionSeqRepository {
    /// Create a new ValidatorSessionSeqRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

impl From<validator_session_seqs::Model> for ValidatorSessionSeq {
    fn from(model: validator_session_seqs::Model) -> Self {
        ValidatorSessionSeq {
            sequence: Sequence {
                height: model.height,
                time: model.time,
            },
            session: model.session,
            stash_account: model.stash_account,
            online: model.online,
        }
    }
}

#[async_trait]
impl ValidatorSessionSeqStore for ValidatorSessionSeqRepository {
    async fn find_by_session(&self, session: i64) -> Result<Vec<ValidatorSessionSeq>, DbError> {
        let results = validator_session_seqs::Entity::find()
            .filter(validator_session_seqs::Column::Session.eq(session))
            .order_by_asc(validator_session_seqs::Column::StashAccount)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(ValidatorSessionSeq::from).collect())
    }

    async fn find_first(&self) -> Result<Option<ValidatorSessionSeq>, DbError> {
        let result = validator_session_seqs::Entity::find()
            .order_by_asc(validator_session_seqs::Column::Height)
            .one(&self.conn)
            .await?;
        Ok(result.map(ValidatorSessionSeq::from))
    }

    async fn find_most_recent(&self) -> Result<Option<ValidatorSessionSeq>, DbError> {
        let result = validator_session_seqs::Entity::find()
            .order_by_desc(validator_session_seqs::Column::Height)
            .one(&self.conn)
            .await?;
        Ok(result.map(ValidatorSessionSeq::from))
    }

    async fn find_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ValidatorSessionSeq>, DbError> {
        let results = validator_session_seqs::Entity::find()
            .filter(validator_session_seqs::Column::Time.gte(start))
            .filter(validator_session_seqs::Column::Time.lt(end))
            .order_by_asc(validator_session_seqs::Column::Height)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(ValidatorSessionSeq::from).collect())
    }

    async fn bulk_upsert(&self, seqs: &[ValidatorSessionSeq]) -> Result<(), DbError> {
        if seqs.is_empty() {
            return Ok(());
        }

        let models = seqs.iter().map(|seq| validator_session_seqs::ActiveModel {
            session: Set(seq.session),
            stash_account: Set(seq.stash_account.clone()),
            height: Set(seq.sequence.height),
            time: Set(seq.sequence.time),
            online: Set(seq.online),
        });

        validator_session_seqs::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    validator_session_seqs::Column::Session,
                    validator_session_seqs::Column::StashAccount,
                ])
                .update_columns([
                    validator_session_seqs::Column::Height,
                    validator_session_seqs::Column::Time,
                    validator_session_seqs::Column::Online,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, DbError> {
        let result = validator_session_seqs::Entity::delete_many()
            .filter(validator_session_seqs::Column::Time.lt(threshold))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}

/// Repository for validator era sequence operations
#[derive(Clone)]
pub struct ValidatorEraSeqRepository {
    conn: DatabaseConnection,
}

impl ValidatorEraSeqRepository {
    /// Create a new ValidatorEraSeqRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ValidatorEraSeqStore for ValidatorEraSeqRepository {
    async fn bulk_upsert(&self, seqs: &[ValidatorEraSeq]) -> Result<(), DbError> {
        if seqs.is_empty() {
            return Ok(());
        }

        let models = seqs.iter().map(|seq| validator_era_seqs::ActiveModel {
            era: Set(seq.era),
            stash_account: Set(seq.stash_account.clone()),
            height: Set(seq.sequence.height),
            time: Set(seq.sequence.time),
            controller_account: Set(seq.controller_account.clone()),
            total_stake: Set(seq.total_stake.to_string()),
            own_stake: Set(seq.own_stake.to_string()),
            stakers_count: Set(seq.stakers_count),
            reward_points: Set(seq.reward_points),
            commission: Set(seq.commission),
        });

        validator_era_seqs::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    validator_era_seqs::Column::Era,
                    validator_era_seqs::Column::StashAccount,
                ])
                .update_columns([
                    validator_era_seqs::Column::Height,
                    validator_era_seqs::Column::Time,
                    validator_era_seqs::Column::ControllerAccount,
                    validator_era_seqs::Column::TotalStake,
                    validator_era_seqs::Column::OwnStake,
                    validator_era_seqs::Column::StakersCount,
                    validator_era_seqs::Column::RewardPoints,
                    validator_era_seqs::Column::Commission,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }
}

/// Repository for per-height validator sequence operations
#[derive(Clone)]
pub struct ValidatorSeqRepository {
    conn: DatabaseConnection,
}

impl ValidatorSeqRepository {
    /// Create a new ValidatorSeqRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ValidatorSeqStore for ValidatorSeqRepository {
    async fn bulk_upsert(&self, seqs: &[ValidatorSeq]) -> Result<(), DbError> {
        if seqs.is_empty() {
            return Ok(());
        }

        let models = seqs.iter().map(|seq| validator_seqs::ActiveModel {
            height: Set(seq.sequence.height),
            stash_account: Set(seq.stash_account.clone()),
            time: Set(seq.sequence.time),
            active_balance: Set(seq.active_balance.to_string()),
        });

        validator_seqs::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    validator_seqs::Column::Height,
                    validator_seqs::Column::StashAccount,
                ])
                .update_columns([
                    validator_seqs::Column::Time,
                    validator_seqs::Column::ActiveBalance,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }
}
