//! In-memory implementation of every storage port.
//!
//! Backs the test suites. Tables are ordered maps keyed by each record's
//! natural key, so upserts and range scans behave like their SQL counterparts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::models::summary::activity_periods;
use crate::domain::models::{
    AccountEraSeq, ActivityPeriod, BlockSeq, BlockSummary, EventSeq, Report, ReportKind,
    RewardClaim, RewardEraSeq, RewardKind, SummaryInterval, Syncable, SystemEvent,
    SystemEventKind, TransactionSeq, ValidatorAgg, ValidatorEraSeq, ValidatorSeq,
    ValidatorSessionSeq, ValidatorSummary,
};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::stores::{
    AccountEraSeqStore, BlockSeqStore, BlockSummaryStore, EventSeqStore, ReportStore,
    RewardStore, Stores, SyncableStore, SystemEventStore, TransactionSeqStore,
    ValidatorAggStore, ValidatorEraSeqStore, ValidatorSeqStore, ValidatorSessionSeqStore,
    ValidatorSummaryStore,
};

pub const SYNCABLES: &str = "syncables";
pub const BLOCK_SEQS: &str = "block_sequences";
pub const VALIDATOR_SESSION_SEQS: &str = "validator_session_sequences";
pub const VALIDATOR_ERA_SEQS: &str = "validator_era_sequences";
pub const VALIDATOR_SEQS: &str = "validator_sequences";
pub const VALIDATOR_AGGS: &str = "validator_aggregates";
pub const EVENT_SEQS: &str = "event_sequences";
pub const ACCOUNT_ERA_SEQS: &str = "account_era_sequences";
pub const TRANSACTION_SEQS: &str = "transaction_sequences";
pub const REWARDS: &str = "reward_era_sequences";
pub const SYSTEM_EVENTS: &str = "system_events";
pub const REPORTS: &str = "reports";
pub const BLOCK_SUMMARIES: &str = "block_summaries";
pub const VALIDATOR_SUMMARIES: &str = "validator_summaries";

type RewardKey = (i64, String, String, RewardKind);

#[derive(Default)]
struct Tables {
    syncables: BTreeMap<i64, Syncable>,
    block_seqs: BTreeMap<i64, BlockSeq>,
    validator_session_seqs: BTreeMap<(i64, String), ValidatorSessionSeq>,
    validator_era_seqs: BTreeMap<(i64, String), ValidatorEraSeq>,
    validator_seqs: BTreeMap<(i64, String), ValidatorSeq>,
    validator_aggs: BTreeMap<String, ValidatorAgg>,
    event_seqs: BTreeMap<(i64, i64), EventSeq>,
    account_era_seqs: BTreeMap<(i64, String, String), AccountEraSeq>,
    transaction_seqs: BTreeMap<(i64, i64), TransactionSeq>,
    rewards: BTreeMap<RewardKey, RewardEraSeq>,
    system_events: BTreeMap<(i64, String, SystemEventKind), SystemEvent>,
    reports: BTreeMap<i64, Report>,
    next_report_id: i64,
    block_summaries: BTreeMap<(SummaryInterval, DateTime<Utc>), BlockSummary>,
    validator_summaries: BTreeMap<(SummaryInterval, DateTime<Utc>, String), ValidatorSummary>,
    failing: HashSet<&'static str>,
}

impl Tables {
    fn check_writable(&self, table: &'static str) -> Result<(), DbError> {
        if self.failing.contains(table) {
            return Err(DbError::QueryError(format!("write to {} rejected", table)));
        }
        Ok(())
    }
}

/// Shared in-memory database
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every port backed by this store
    pub fn stores(&self) -> Stores {
        Stores {
            syncables: Arc::new(self.clone()),
            block_seqs: Arc::new(self.clone()),
            validator_session_seqs: Arc::new(self.clone()),
            validator_era_seqs: Arc::new(self.clone()),
            validator_seqs: Arc::new(self.clone()),
            validator_aggs: Arc::new(self.clone()),
            event_seqs: Arc::new(self.clone()),
            account_era_seqs: Arc::new(self.clone()),
            transaction_seqs: Arc::new(self.clone()),
            rewards: Arc::new(self.clone()),
            system_events: Arc::new(self.clone()),
            reports: Arc::new(self.clone()),
            block_summaries: Arc::new(self.clone()),
            validator_summaries: Arc::new(self.clone()),
        }
    }

    /// Makes every subsequent write to `table` fail
    pub fn fail_writes_to(&self, table: &'static str) {
        self.lock().failing.insert(table);
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn syncables(&self) -> Vec<Syncable> {
        self.lock().syncables.values().cloned().collect()
    }

    pub fn block_seqs(&self) -> Vec<BlockSeq> {
        self.lock().block_seqs.values().cloned().collect()
    }

    pub fn validator_session_seqs(&self) -> Vec<ValidatorSessionSeq> {
        self.lock().validator_session_seqs.values().cloned().collect()
    }

    pub fn validator_era_seqs(&self) -> Vec<ValidatorEraSeq> {
        self.lock().validator_era_seqs.values().cloned().collect()
    }

    pub fn validator_seqs(&self) -> Vec<ValidatorSeq> {
        self.lock().validator_seqs.values().cloned().collect()
    }

    pub fn validator_aggs(&self) -> Vec<ValidatorAgg> {
        self.lock().validator_aggs.values().cloned().collect()
    }

    pub fn event_seqs(&self) -> Vec<EventSeq> {
        self.lock().event_seqs.values().cloned().collect()
    }

    pub fn account_era_seqs(&self) -> Vec<AccountEraSeq> {
        self.lock().account_era_seqs.values().cloned().collect()
    }

    pub fn transaction_seqs(&self) -> Vec<TransactionSeq> {
        self.lock().transaction_seqs.values().cloned().collect()
    }

    pub fn rewards(&self) -> Vec<RewardEraSeq> {
        self.lock().rewards.values().cloned().collect()
    }

    pub fn system_events(&self) -> Vec<SystemEvent> {
        self.lock().system_events.values().cloned().collect()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.lock().reports.values().cloned().collect()
    }

    pub fn block_summaries(&self) -> Vec<BlockSummary> {
        self.lock().block_summaries.values().cloned().collect()
    }

    pub fn validator_summaries(&self) -> Vec<ValidatorSummary> {
        self.lock().validator_summaries.values().cloned().collect()
    }
}

#[async_trait]
impl SyncableStore for InMemoryStore {
    async fn find_by_height(&self, height: i64) -> Result<Option<Syncable>, DbError> {
        Ok(self.lock().syncables.get(&height).cloned())
    }

    async fn find_most_recent(&self) -> Result<Option<Syncable>, DbError> {
        Ok(self.lock().syncables.values().next_back().cloned())
    }

    async fn find_first_by_different_index_version(
        &self,
        index_version: i64,
    ) -> Result<Option<Syncable>, DbError> {
        Ok(self
            .lock()
            .syncables
            .values()
            .find(|s| s.index_version != index_version)
            .cloned())
    }

    async fn find_most_recent_by_different_index_version(
        &self,
        index_version: i64,
    ) -> Result<Option<Syncable>, DbError> {
        Ok(self
            .lock()
            .syncables
            .values()
            .rev()
            .find(|s| s.index_version != index_version)
            .cloned())
    }

    async fn find_all_by_last_in_session_or_era(
        &self,
        index_version: i64,
        last_in_session: bool,
        last_in_era: bool,
    ) -> Result<Vec<Syncable>, DbError> {
        Ok(self
            .lock()
            .syncables
            .values()
            .filter(|s| s.index_version != index_version)
            .filter(|s| (last_in_session && s.last_in_session) || (last_in_era && s.last_in_era))
            .cloned()
            .collect())
    }

    async fn create_or_update(&self, syncable: &Syncable) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(SYNCABLES)?;
        let created_at = tables
            .syncables
            .get(&syncable.height)
            .map(|existing| existing.created_at)
            .unwrap_or(syncable.created_at);
        let mut row = syncable.clone();
        row.created_at = created_at;
        tables.syncables.insert(syncable.height, row);
        Ok(())
    }
}

#[async_trait]
impl BlockSeqStore for InMemoryStore {
    async fn find_by_height(&self, height: i64) -> Result<Option<BlockSeq>, DbError> {
        Ok(self.lock().block_seqs.get(&height).cloned())
    }

    async fn find_first(&self) -> Result<Option<BlockSeq>, DbError> {
        Ok(self.lock().block_seqs.values().next().cloned())
    }

    async fn find_most_recent(&self) -> Result<Option<BlockSeq>, DbError> {
        Ok(self.lock().block_seqs.values().next_back().cloned())
    }

    async fn find_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BlockSeq>, DbError> {
        Ok(self
            .lock()
            .block_seqs
            .values()
            .filter(|seq| seq.sequence.time >= start && seq.sequence.time < end)
            .cloned()
            .collect())
    }

    async fn create(&self, seq: &BlockSeq) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(BLOCK_SEQS)?;
        if tables.block_seqs.contains_key(&seq.sequence.height) {
            return Err(DbError::QueryError(format!(
                "block sequence at height {} already exists",
                seq.sequence.height
            )));
        }
        tables.block_seqs.insert(seq.sequence.height, seq.clone());
        Ok(())
    }

    async fn save(&self, seq: &BlockSeq) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(BLOCK_SEQS)?;
        match tables.block_seqs.get_mut(&seq.sequence.height) {
            Some(existing) => {
                *existing = seq.clone();
                Ok(())
            }
            None => Err(DbError::QueryError(format!(
                "block sequence at height {} does not exist",
                seq.sequence.height
            ))),
        }
    }

    async fn delete_older_than(
        &self,
        threshold: DateTime<Utc>,
        periods: &[ActivityPeriod],
    ) -> Result<u64, DbError> {
        let mut tables = self.lock();
        tables.check_writable(BLOCK_SEQS)?;
        let before = tables.block_seqs.len();
        tables.block_seqs.retain(|_, seq| {
            let time = seq.sequence.time;
            !(time < threshold && periods.iter().any(|p| p.contains(time)))
        });
        Ok((before - tables.block_seqs.len()) as u64)
    }
}

#[async_trait]
impl ValidatorSessionSeqStore for InMemoryStore {
    async fn find_by_session(&self, session: i64) -> Result<Vec<ValidatorSessionSeq>, DbError> {
        Ok(self
            .lock()
            .validator_session_seqs
            .values()
            .filter(|seq| seq.session == session)
            .cloned()
            .collect())
    }

    async fn find_first(&self) -> Result<Option<ValidatorSessionSeq>, DbError> {
        Ok(self
            .lock()
            .validator_session_seqs
            .values()
            .min_by_key(|seq| seq.sequence.height)
            .cloned())
    }

    async fn find_most_recent(&self) -> Result<Option<ValidatorSessionSeq>, DbError> {
        Ok(self
            .lock()
            .validator_session_seqs
            .values()
            .max_by_key(|seq| seq.sequence.height)
            .cloned())
    }

    async fn find_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ValidatorSessionSeq>, DbError> {
        let mut seqs: Vec<ValidatorSessionSeq> = self
            .lock()
            .validator_session_seqs
            .values()
            .filter(|seq| seq.sequence.time >= start && seq.sequence.time < end)
            .cloned()
            .collect();
        seqs.sort_by_key(|seq| seq.sequence.height);
        Ok(seqs)
    }

    async fn bulk_upsert(&self, seqs: &[ValidatorSessionSeq]) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(VALIDATOR_SESSION_SEQS)?;
        for seq in seqs {
            tables
                .validator_session_seqs
                .insert((seq.session, seq.stash_account.clone()), seq.clone());
        }
        Ok(())
    }

    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, DbError> {
        let mut tables = self.lock();
        tables.check_writable(VALIDATOR_SESSION_SEQS)?;
        let before = tables.validator_session_seqs.len();
        tables
            .validator_session_seqs
            .retain(|_, seq| seq.sequence.time >= threshold);
        Ok((before - tables.validator_session_seqs.len()) as u64)
    }
}

#[async_trait]
impl ValidatorEraSeqStore for InMemoryStore {
    async fn bulk_upsert(&self, seqs: &[ValidatorEraSeq]) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(VALIDATOR_ERA_SEQS)?;
        for seq in seqs {
            tables
                .validator_era_seqs
                .insert((seq.era, seq.stash_account.clone()), seq.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl ValidatorSeqStore for InMemoryStore {
    async fn bulk_upsert(&self, seqs: &[ValidatorSeq]) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(VALIDATOR_SEQS)?;
        for seq in seqs {
            tables
                .validator_seqs
                .insert((seq.sequence.height, seq.stash_account.clone()), seq.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl ValidatorAggStore for InMemoryStore {
    async fn find_by_stash_account(&self, stash: &str) -> Result<Option<ValidatorAgg>, DbError> {
        Ok(self.lock().validator_aggs.get(stash).cloned())
    }

    async fn create(&self, agg: &ValidatorAgg) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(VALIDATOR_AGGS)?;
        if tables.validator_aggs.contains_key(&agg.stash_account) {
            return Err(DbError::QueryError(format!(
                "validator aggregate {} already exists",
                agg.stash_account
            )));
        }
        tables
            .validator_aggs
            .insert(agg.stash_account.clone(), agg.clone());
        Ok(())
    }

    async fn save(&self, agg: &ValidatorAgg) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(VALIDATOR_AGGS)?;
        match tables.validator_aggs.get_mut(&agg.stash_account) {
            Some(existing) => {
                *existing = agg.clone();
                Ok(())
            }
            None => Err(DbError::QueryError(format!(
                "validator aggregate {} does not exist",
                agg.stash_account
            ))),
        }
    }
}

#[async_trait]
impl EventSeqStore for InMemoryStore {
    async fn bulk_upsert(&self, seqs: &[EventSeq]) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(EVENT_SEQS)?;
        for seq in seqs {
            tables
                .event_seqs
                .insert((seq.sequence.height, seq.index), seq.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl AccountEraSeqStore for InMemoryStore {
    async fn bulk_upsert(&self, seqs: &[AccountEraSeq]) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(ACCOUNT_ERA_SEQS)?;
        for seq in seqs {
            let key = (
                seq.era,
                seq.stash_account.clone(),
                seq.validator_stash_account.clone(),
            );
            tables.account_era_seqs.insert(key, seq.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionSeqStore for InMemoryStore {
    async fn bulk_upsert(&self, seqs: &[TransactionSeq]) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(TRANSACTION_SEQS)?;
        for seq in seqs {
            tables
                .transaction_seqs
                .insert((seq.sequence.height, seq.index), seq.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl RewardStore for InMemoryStore {
    async fn bulk_upsert(&self, rewards: &[RewardEraSeq]) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(REWARDS)?;
        for reward in rewards {
            let key = (
                reward.era,
                reward.stash_account.clone(),
                reward.validator_stash_account.clone(),
                reward.kind,
            );
            let claimed = tables.rewards.get(&key).map(|r| r.claimed).unwrap_or(false);
            let mut row = reward.clone();
            row.claimed = row.claimed || claimed;
            tables.rewards.insert(key, row);
        }
        Ok(())
    }

    async fn mark_all_claimed(&self, claim: &RewardClaim) -> Result<u64, DbError> {
        let mut tables = self.lock();
        tables.check_writable(REWARDS)?;
        let mut marked = 0;
        for reward in tables.rewards.values_mut() {
            if reward.era == claim.era && reward.validator_stash_account == claim.validator_stash {
                reward.claimed = true;
                marked += 1;
            }
        }
        Ok(marked)
    }
}

#[async_trait]
impl SystemEventStore for InMemoryStore {
    async fn bulk_upsert(&self, events: &[SystemEvent]) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(SYSTEM_EVENTS)?;
        for event in events {
            let key = (event.sequence.height, event.actor.clone(), event.kind);
            tables.system_events.insert(key, event.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn find_not_completed_by_kinds(
        &self,
        kinds: &[ReportKind],
    ) -> Result<Option<Report>, DbError> {
        Ok(self
            .lock()
            .reports
            .values()
            .rev()
            .find(|r| kinds.contains(&r.kind) && r.completed_at.is_none())
            .cloned())
    }

    async fn create(&self, report: &Report) -> Result<Report, DbError> {
        let mut tables = self.lock();
        tables.check_writable(REPORTS)?;
        tables.next_report_id += 1;
        let mut stored = report.clone();
        stored.id = tables.next_report_id;
        tables.reports.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn save(&self, report: &Report) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(REPORTS)?;
        match tables.reports.get_mut(&report.id) {
            Some(existing) => {
                *existing = report.clone();
                Ok(())
            }
            None => Err(DbError::QueryError(format!(
                "report {} does not exist",
                report.id
            ))),
        }
    }

    async fn delete_by_kinds(&self, kinds: &[ReportKind]) -> Result<u64, DbError> {
        let mut tables = self.lock();
        tables.check_writable(REPORTS)?;
        let before = tables.reports.len();
        tables.reports.retain(|_, r| !kinds.contains(&r.kind));
        Ok((before - tables.reports.len()) as u64)
    }
}

#[async_trait]
impl BlockSummaryStore for InMemoryStore {
    async fn find_most_recent_by_interval(
        &self,
        interval: SummaryInterval,
    ) -> Result<Option<BlockSummary>, DbError> {
        Ok(self
            .lock()
            .block_summaries
            .values()
            .filter(|s| s.time_interval == interval)
            .max_by_key(|s| s.time_bucket)
            .cloned())
    }

    async fn find_activity_periods(
        &self,
        interval: SummaryInterval,
        index_version: i64,
    ) -> Result<Vec<ActivityPeriod>, DbError> {
        let buckets: Vec<DateTime<Utc>> = self
            .lock()
            .block_summaries
            .values()
            .filter(|s| s.time_interval == interval && s.index_version == index_version)
            .map(|s| s.time_bucket)
            .collect();
        Ok(activity_periods(&buckets, interval))
    }

    async fn upsert(&self, summary: &BlockSummary) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(BLOCK_SUMMARIES)?;
        tables
            .block_summaries
            .insert((summary.time_interval, summary.time_bucket), summary.clone());
        Ok(())
    }

    async fn delete_older_than(
        &self,
        interval: SummaryInterval,
        threshold: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        let mut tables = self.lock();
        tables.check_writable(BLOCK_SUMMARIES)?;
        let before = tables.block_summaries.len();
        tables
            .block_summaries
            .retain(|_, s| s.time_interval != interval || s.time_bucket >= threshold);
        Ok((before - tables.block_summaries.len()) as u64)
    }
}

#[async_trait]
impl ValidatorSummaryStore for InMemoryStore {
    async fn find_most_recent(&self) -> Result<Option<ValidatorSummary>, DbError> {
        Ok(self
            .lock()
            .validator_summaries
            .values()
            .max_by_key(|s| s.time_bucket)
            .cloned())
    }

    async fn find_most_recent_by_interval(
        &self,
        interval: SummaryInterval,
    ) -> Result<Option<ValidatorSummary>, DbError> {
        Ok(self
            .lock()
            .validator_summaries
            .values()
            .filter(|s| s.time_interval == interval)
            .max_by_key(|s| s.time_bucket)
            .cloned())
    }

    async fn upsert(&self, summary: &ValidatorSummary) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.check_writable(VALIDATOR_SUMMARIES)?;
        let key = (
            summary.time_interval,
            summary.time_bucket,
            summary.stash_account.clone(),
        );
        tables.validator_summaries.insert(key, summary.clone());
        Ok(())
    }

    async fn delete_older_than(
        &self,
        interval: SummaryInterval,
        threshold: DateTime<Utc>,
    ) -> Result<u64, DbError> {
        let mut tables = self.lock();
        tables.check_writable(VALIDATOR_SUMMARIES)?;
        let before = tables.validator_summaries.len();
        tables
            .validator_summaries
            .retain(|_, s| s.time_interval != interval || s.time_bucket >= threshold);
        Ok((before - tables.validator_summaries.len()) as u64)
    }
}
