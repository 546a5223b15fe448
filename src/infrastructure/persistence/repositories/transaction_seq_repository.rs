use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::domain::models::TransactionSeq;
use crate::infrastructure::persistence::entities::transaction_seqs;
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::stores::TransactionSeqStore;

/// Repository for transaction sequence operations
#[derive(Clone)]
pub struct TransactionSeqRepository {
    conn: DatabaseConnection,
}

impl TransactionSeqRepository {
    /// Create a new TransactionSeqRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl TransactionSeqStore for TransactionSeqRepository {
    async fn bulk_upsert(&self, seqs: &[TransactionSeq]) -> Result<(), DbError> {
        if seqs.is_empty() {
            return Ok(());
        }

        let models = seqs.iter().map(|seq| transaction_seqs::ActiveModel {
            height: Set(seq.sequence.height),
            index: Set(seq.index),
            time: Set(seq.sequence.time),
            hash: Set(seq.hash.clone()),
            signer: Set(seq.signer.clone()),
            section: Set(seq.section.clone()),
            method: Set(seq.method.clone()),
            is_success: Set(seq.is_success),
            args: Set(seq.args.clone()),
        });

        transaction_seqs::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    transaction_seqs::Column::Height,
                    transaction_seqs::Column::Index,
                ])
                .update_columns([
                    transaction_seqs::Column::Time,
                    transaction_seqs::Column::Hash,
                    transaction_seqs::Column::Signer,
                    transaction_seqs::Column::Section,
                    transaction_seqs::Column::Method,
                    transaction_seqs::Column::IsSuccess,
                    transaction_seqs::Column::Args,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }
}
