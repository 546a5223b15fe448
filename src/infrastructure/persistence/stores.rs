//! Storage ports consumed by the indexing pipeline.
//!
//! Every lookup returns `Ok(None)` (or an empty vector) when nothing matches;
//! a missing row is never an error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::models::{
    AccountEraSeq, ActivityPeriod, BlockSeq, BlockSummary, EventSeq, Report, ReportKind,
    RewardClaim, RewardEraSeq, SummaryInterval, Syncable, SystemEvent, TransactionSeq,
    ValidatorAgg, ValidatorEraSeq, ValidatorSeq, ValidatorSessionSeq, ValidatorSummary,
};
use crate::infrastructure::persistence::error::DbError;

#[async_trait]
pub trait SyncableStore: Send + Sync {
    async fn find_by_height(&self, height: i64) -> Result<Option<Syncable>, DbError>;

    async fn find_most_recent(&self) -> Result<Option<Syncable>, DbError>;

    /// Lowest height indexed with a version other than `index_version`
    async fn find_first_by_different_index_version(
        &self,
        index_version: i64,
    ) -> Result<Option<Syncable>, DbError>;

    /// Highest height indexed with a version other than `index_version`
    async fn find_most_recent_by_different_index_version(
        &self,
        index_version: i64,
    ) -> Result<Option<Syncable>, DbError>;

    /// Outdated syncables closing a session (when `last_in_session`) or an era
    /// (when `last_in_era`), ordered by height
    async fn find_all_by_last_in_session_or_era(
        &self,
        index_version: i64,
        last_in_session: bool,
        last_in_era: bool,
    ) -> Result<Vec<Syncable>, DbError>;

    async fn create_or_update(&self, syncable: &Syncable) -> Result<(), DbError>;
}

#[async_trait]
pub trait BlockSeqStore: Send + Sync {
    async fn find_by_height(&self, height: i64) -> Result<Option<BlockSeq>, DbError>;

    async fn find_first(&self) -> Result<Option<BlockSeq>, DbError>;

    async fn find_most_recent(&self) -> Result<Option<BlockSeq>, DbError>;

    /// Sequences with `start <= time < end`, ordered by height
    async fn find_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BlockSeq>, DbError>;

    async fn create(&self, seq: &BlockSeq) -> Result<(), DbError>;

    async fn save(&self, seq: &BlockSeq) -> Result<(), DbError>;

    /// Deletes sequences older than `threshold` that fall inside one of
    /// `periods`. Returns the number of deleted rows.
    async fn delete_older_than(
        &self,
        threshold: DateTime<Utc>,
        periods: &[ActivityPeriod],
    ) -> Result<u64, DbError>;
}

#[async_trait]
pub trait ValidatorSessionSeqStore: Send + Sync {
    async fn find_by_session(&self, session: i64) -> Result<Vec<ValidatorSessionSeq>, DbError>;

    async fn find_first(&self) -> Result<Option<ValidatorSessionSeq>, DbError>;

    async fn find_most_recent(&self) -> Result<Option<ValidatorSessionSeq>, DbError>;

    async fn find_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ValidatorSessionSeq>, DbError>;

    async fn bulk_upsert(&self, seqs: &[ValidatorSessionSeq]) -> Result<(), DbError>;

    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, DbError>;
}

#[async_trait]
pub trait ValidatorEraSeqStore: Send + Sync {
    async fn bulk_upsert(&self, seqs: &[ValidatorEraSeq]) -> Result<(), DbError>;
}

#[async_trait]
pub trait ValidatorSeqStore: Send + Sync {
    async fn bulk_upsert(&self, seqs: &[ValidatorSeq]) -> Result<(), DbError>;
}

#[async_trait]
pub trait EventSeqStore: Send + Sync {
    async fn bulk_upsert(&self, seqs: &[EventSeq]) -> Result<(), DbError>;
}

#[async_trait]
pub trait AccountEraSeqStore: Send + Sync {
    async fn bulk_upsert(&self, seqs: &[AccountEraSeq]) -> Result<(), DbError>;
}

#[async_trait]
pub trait TransactionSeqStore: Send + Sync {
    async fn bulk_upsert(&self, seqs: &[TransactionSeq]) -> Result<(), DbError>;
}

#[async_trait]
pub trait SystemEventStore: Send + Sync {
    async fn bulk_upsert(&self, events: &[SystemEvent]) -> Result<(), DbError>;
}

#[async_trait]
pub trait ValidatorAggStore: Send + Sync {
    async fn find_by_stash_account(&self, stash: &str) -> Result<Option<ValidatorAgg>, DbError>;

    async fn create(&self, agg: &ValidatorAgg) -> Result<(), DbError>;

    async fn save(&self, agg: &ValidatorAgg) -> Result<(), DbError>;
}

#[async_trait]
pub trait RewardStore: Send + Sync {
    async fn bulk_upsert(&self, rewards: &[RewardEraSeq]) -> Result<(), DbError>;

    /// Flags every reward paid through `claim.validator_stash` for `claim.era`
    async fn mark_all_claimed(&self, claim: &RewardClaim) -> Result<u64, DbError>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Any report of one of `kinds` that has not completed yet
    async fn find_not_completed_by_kinds(
        &self,
        kinds: &[ReportKind],
    ) -> Result<Option<Report>, DbError>;

    /// Stores a new report and returns it with its assigned id
    async fn create(&self, report: &Report) -> Result<Report, DbError>;

    async fn save(&self, report: &Report) -> Result<(), DbError>;

    async fn delete_by_kinds(&self, kinds: &[ReportKind]) -> Result<u64, DbError>;
}

#[async_trait]
pub trait BlockSummaryStore: Send + Sync {
    async fn find_most_recent_by_interval(
        &self,
        interval: SummaryInterval,
    ) -> Result<Option<BlockSummary>, DbError>;

    async fn find_activity_periods(
        &self,
        interval: SummaryInterval,
        index_version: i64,
    ) -> Result<Vec<ActivityPeriod>, DbError>;

    async fn upsert(&self, summary: &BlockSummary) -> Result<(), DbError>;

    async fn delete_older_than(
        &self,
        interval: SummaryInterval,
        threshold: DateTime<Utc>,
    ) -> Result<u64, DbError>;
}

#[async_trait]
pub trait ValidatorSummaryStore: Send + Sync {
    async fn find_most_recent(&self) -> Result<Option<ValidatorSummary>, DbError>;

    async fn find_most_recent_by_interval(
        &self,
        interval: SummaryInterval,
    ) -> Result<Option<ValidatorSummary>, DbError>;

    async fn upsert(&self, summary: &ValidatorSummary) -> Result<(), DbError>;

    async fn delete_older_than(
        &self,
        interval: SummaryInterval,
        threshold: DateTime<Utc>,
    ) -> Result<u64, DbError>;
}

/// Every storage port, shared by tasks and use cases
#[derive(Clone)]
pub struct Stores {
    pub syncables: Arc<dyn SyncableStore>,
    pub block_seqs: Arc<dyn BlockSeqStore>,
    pub validator_session_seqs: Arc<dyn ValidatorSessionSeqStore>,
    pub validator_era_seqs: Arc<dyn ValidatorEraSeqStore>,
    pub validator_seqs: Arc<dyn ValidatorSeqStore>,
    pub validator_aggs: Arc<dyn ValidatorAggStore>,
    pub event_seqs: Arc<dyn EventSeqStore>,
    pub account_era_seqs: Arc<dyn AccountEraSeqStore>,
    pub transaction_seqs: Arc<dyn TransactionSeqStore>,
    pub rewards: Arc<dyn RewardStore>,
    pub system_events: Arc<dyn SystemEventStore>,
    pub reports: Arc<dyn ReportStore>,
    pub block_summaries: Arc<dyn BlockSummaryStore>,
    pub validator_summaries: Arc<dyn ValidatorSummaryStore>,
}
