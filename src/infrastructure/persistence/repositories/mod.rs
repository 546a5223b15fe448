pub mod account_era_seq_repository;
pub mod block_seq_repository;
pub mod event_repository;
pub mod in_memory;
pub mod report_repository;
pub mod reward_repository;
pub mod summary_repository;
pub mod syncable_repository;
pub mod transaction_seq_repository;
pub mod validator_agg_repository;
pub mod validator_seq_repository;

pub use account_era_seq_repository::AccountEraSeqRepository;
pub use block_seq_repository::BlockSeqRepository;
pub use event_repository::{EventSeqRepository, SystemEventRepository};
pub use in_memory::InMemoryStore;
pub use report_repository::ReportRepository;
pub use reward_repository::RewardRepository;
pub use summary_repository::{BlockSummaryRepository, ValidatorSummaryRepository};
pub use syncable_repository::SyncableRepository;
pub use transaction_seq_repository::TransactionSeqRepository;
pub use validator_agg_repository::ValidatorAggRepository;
pub use validator_seq_repository::{
    ValidatorEraSeqRepository, ValidatorSeqRepository, ValidatorSessionSeqRepository,
};
