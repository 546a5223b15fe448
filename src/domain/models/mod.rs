pub mod account_era_seq;
pub mod block_seq;
pub mod chain;
pub mod event_seq;
pub mod quantity;
pub mod report;
pub mod reward;
pub mod summary;
pub mod syncable;
pub mod transaction_seq;
pub mod validator_agg;
pub mod validator_seq;

pub use account_era_seq::AccountEraSeq;
pub use block_seq::BlockSeq;
pub use chain::{
    ChainStatus, HeightMeta, RawBlock, RawEvent, RawExtrinsic, RawHeightData, RawStaker,
    RawStaking, RawStakingValidator, RawValidatorPerformance,
};
pub use event_seq::{EventSeq, SystemEvent, SystemEventKind};
pub use quantity::Quantity;
pub use report::{Report, ReportKind, ReportStatus};
pub use reward::{RewardClaim, RewardEraSeq, RewardKind};
pub use summary::{ActivityPeriod, BlockSummary, SummaryInterval, ValidatorSummary};
pub use syncable::{Sequence, Syncable};
pub use transaction_seq::TransactionSeq;
pub use validator_agg::{Aggregate, ValidatorAgg};
pub use validator_seq::{ValidatorEraSeq, ValidatorSeq, ValidatorSessionSeq};
