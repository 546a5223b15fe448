use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::infrastructure::persistence::connection::DbPool;
use crate::infrastructure::persistence::repositories::{
    AccountEraSeqRepository, BlockSeqRepository, BlockSummaryRepository, EventSeqRepository,
    ReportRepository, RewardRepository, SyncableRepository, SystemEventRepository,
    TransactionSeqRepository, ValidatorAggRepository, ValidatorEraSeqRepository,
    ValidatorSeqRepository, ValidatorSessionSeqRepository, ValidatorSummaryRepository,
};
use crate::infrastructure::persistence::stores::Stores;

/// Factory for creating repositories
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create every storage port over one shared connection
    pub fn create_stores(db_pool: &DbPool) -> Stores {
        let conn = db_pool.get_connection().clone();
        Self::create_stores_with_connection(conn)
    }

    pub fn create_stores_with_connection(conn: DatabaseConnection) -> Stores {
        Stores {
            syncables: Arc::new(SyncableRepository::new(conn.clone())),
            block_seqs: Arc::new(BlockSeqRepository::new(conn.clone())),
            validator_session_seqs: Arc::new(ValidatorSessionSeqRepository::new(conn.clone())),
            validator_era_seqs: Arc::new(ValidatorEraSeqRepository::new(conn.clone())),
            validator_seqs: Arc::new(ValidatorSeqRepository::new(conn.clone())),
            validator_aggs: Arc::new(ValidatorAggRepository::new(conn.clone())),
            event_seqs: Arc::new(EventSeqRepository::new(conn.clone())),
            account_era_seqs: Arc::new(AccountEraSeqRepository::new(conn.clone())),
            transaction_seqs: Arc::new(TransactionSeqRepository::new(conn.clone())),
            rewards: Arc::new(RewardRepository::new(conn.clone())),
            system_events: Arc::new(SystemEventRepository::new(conn.clone())),
            reports: Arc::new(ReportRepository::new(conn.clone())),
            block_summaries: Arc::new(BlockSummaryRepository::new(conn.clone())),
            validator_summaries: Arc::new(ValidatorSummaryRepository::new(conn)),
        }
    }
}
