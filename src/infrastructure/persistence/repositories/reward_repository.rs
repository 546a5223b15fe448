use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::models::{RewardClaim, RewardEraSeq};
use crate::infrastructure::persistence::entities::reward_era_seqs;
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::stores::RewardStore;

/// Repository for era reward operations
#[derive(Clone)]
pub struct RewardRepository {
    conn: DatabaseConnection,
}

impl RewardRepository {
    /// Create a new RewardRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RewardStore for RewardRepository {
    async fn bulk_upsert(&self, rewards: &[RewardEraSeq]) -> Result<(), DbError> {
        if rewards.is_empty() {
            return Ok(());
        }

        let models = rewards.iter().map(|reward| reward_era_seqs::ActiveModel {
            era: Set(reward.era),
            stash_account: Set(reward.stash_account.clone()),
            validator_stash_account: Set(reward.validator_stash_account.clone()),
            kind: Set(reward.kind.as_str().to_string()),
            height: Set(reward.sequence.height),
            time: Set(reward.sequence.time),
            amount: Set(reward.amount.to_string()),
            claimed: Set(reward.claimed),
        });

        // `claimed` is left alone on conflict so a reindex never unmarks a payout
        reward_era_seqs::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    reward_era_seqs::Column::Era,
                    reward_era_seqs::Column::StashAccount,
                    reward_era_seqs::Column::ValidatorStashAccount,
                    reward_era_seqs::Column::Kind,
                ])
                .update_columns([
                    reward_era_seqs::Column::Height,
                    reward_era_seqs::Column::Time,
                    reward_era_seqs::Column::Amount,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    async fn mark_all_claimed(&self, claim: &RewardClaim) -> Result<u64, DbError> {
        let result = reward_era_seqs::Entity::update_many()
            .col_expr(reward_era_seqs::Column::Claimed, Expr::value(true))
            .filter(reward_era_seqs::Column::ValidatorStashAccount.eq(claim.validator_stash.clone()))
            .filter(reward_era_seqs::Column::Era.eq(claim.era))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
