use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::domain::models::AccountEraSeq;
use crate::infrastructure::persistence::entities::account_era_seqs;
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::stores::AccountEraSeqStore;

/// Repository for account era sequence operations
#[derive(Clone)]
pub struct AccountEraSeqRepository {
    conn: DatabaseConnection,
}

impl AccountEraSeqRepository {
    /// Create a new AccountEraSeqRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl AccountEraSeqStore for AccountEraSeqRepository {
    async fn bulk_upsert(&self, seqs: &[AccountEraSeq]) -> Result<(), DbError> {
        if seqs.is_empty() {
            return Ok(());
        }

        let models = seqs.iter().map(|seq| account_era_seqs::ActiveModel {
            era: Set(seq.era),
            stash_account: Set(seq.stash_account.clone()),
            validator_stash_account: Set(seq.validator_stash_account.clone()),
            height: Set(seq.sequence.height),
            time: Set(seq.sequence.time),
            stake: Set(seq.stake.to_string()),
        });

        account_era_seqs::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    account_era_seqs::Column::Era,
                    account_era_seqs::Column::StashAccount,
                    account_era_seqs::Column::ValidatorStashAccount,
                ])
                .update_columns([
                    account_era_seqs::Column::Height,
                    account_era_seqs::Column::Time,
                    account_era_seqs::Column::Stake,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }
}
