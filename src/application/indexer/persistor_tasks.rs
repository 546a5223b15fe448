use async_trait::async_trait;
use std::sync::Arc;

use crate::application::indexer::payload::Payload;
use crate::application::pipeline::{StageName, Task};
use crate::application::pipeline::TaskError;
use crate::infrastructure::persistence::stores::{
    AccountEraSeqStore, BlockSeqStore, EventSeqStore, RewardStore, SyncableStore,
    SystemEventStore, TransactionSeqStore, ValidatorAggStore, ValidatorEraSeqStore,
    ValidatorSeqStore, ValidatorSessionSeqStore,
};
use crate::utils::logging;

pub const SYNCER_PERSISTOR_TASK_NAME: &str = "SyncerPersistor";
pub const BLOCK_SEQ_PERSISTOR_TASK_NAME: &str = "BlockSeqPersistor";
pub const VALIDATOR_SESSION_SEQ_PERSISTOR_TASK_NAME: &str = "ValidatorSessionSeqPersistor";
pub const VALIDATOR_ERA_SEQ_PERSISTOR_TASK_NAME: &str = "ValidatorEraSeqPersistor";
pub const VALIDATOR_AGG_PERSISTOR_TASK_NAME: &str = "ValidatorAggPersistor";
pub const EVENT_SEQ_PERSISTOR_TASK_NAME: &str = "EventSeqPersistor";
pub const ACCOUNT_ERA_SEQ_PERSISTOR_TASK_NAME: &str = "AccountEraSeqPersistor";
pub const TRANSACTION_SEQ_PERSISTOR_TASK_NAME: &str = "TransactionSeqPersistor";
pub const VALIDATOR_SEQ_PERSISTOR_TASK_NAME: &str = "ValidatorSeqPersistor";
pub const SYSTEM_EVENT_PERSISTOR_TASK_NAME: &str = "SystemEventPersistor";
pub const REWARD_ERA_SEQ_PERSISTOR_TASK_NAME: &str = "RewardEraSeqPersistor";

fn log_running(task: &'static str, height: i64) {
    logging::log_task(StageName::Persistor.as_str(), task, height, "running indexer task");
}

fn log_skipped(task: &'static str, height: i64, reason: &str) {
    logging::log_task(StageName::Persistor.as_str(), task, height, reason);
}

pub struct SyncerPersistorTask {
    syncables: Arc<dyn SyncableStore>,
}

impl SyncerPersistorTask {
    pub fn new(syncables: Arc<dyn SyncableStore>) -> Self {
        Self { syncables }
    }
}

#[async_trait]
impl Task<Payload> for SyncerPersistorTask {
    fn name(&self) -> &'static str {
        SYNCER_PERSISTOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);
        self.syncables.create_or_update(payload.syncable()?).await?;
        Ok(())
    }
}

pub struct BlockSeqPersistorTask {
    block_seqs: Arc<dyn BlockSeqStore>,
}

impl BlockSeqPersistorTask {
    pub fn new(block_seqs: Arc<dyn BlockSeqStore>) -> Self {
        Self { block_seqs }
    }
}

#[async_trait]
impl Task<Payload> for BlockSeqPersistorTask {
    fn name(&self) -> &'static str {
        BLOCK_SEQ_PERSISTOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);

        if let Some(seq) = &payload.new_block_sequence {
            self.block_seqs.create(seq).await?;
        } else if let Some(seq) = &payload.updated_block_sequence {
            self.block_seqs.save(seq).await?;
        }
        Ok(())
    }
}

pub struct ValidatorSessionSeqPersistorTask {
    session_seqs: Arc<dyn ValidatorSessionSeqStore>,
}

impl ValidatorSessionSeqPersistorTask {
    pub fn new(session_seqs: Arc<dyn ValidatorSessionSeqStore>) -> Self {
        Self { session_seqs }
    }
}

#[async_trait]
impl Task<Payload> for ValidatorSessionSeqPersistorTask {
    fn name(&self) -> &'static str {
        VALIDATOR_SESSION_SEQ_PERSISTOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        if !payload.syncable()?.last_in_session {
            log_skipped(self.name(), payload.current_height, "not last in session, skipping");
            return Ok(());
        }
        log_running(self.name(), payload.current_height);
        self.session_seqs
            .bulk_upsert(&payload.validator_session_sequences)
            .await?;
        Ok(())
    }
}

pub struct ValidatorEraSeqPersistorTask {
    era_seqs: Arc<dyn ValidatorEraSeqStore>,
}

impl ValidatorEraSeqPersistorTask {
    pub fn new(era_seqs: Arc<dyn ValidatorEraSeqStore>) -> Self {
        Self { era_seqs }
    }
}

#[async_trait]
impl Task<Payload> for ValidatorEraSeqPersistorTask {
    fn name(&self) -> &'static str {
        VALIDATOR_ERA_SEQ_PERSISTOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        if !payload.syncable()?.last_in_era {
            log_skipped(self.name(), payload.current_height, "not last in era, skipping");
            return Ok(());
        }
        log_running(self.name(), payload.current_height);
        self.era_seqs.bulk_upsert(&payload.validator_era_sequences).await?;
        Ok(())
    }
}

pub struct AccountEraSeqPersistorTask {
    account_era_seqs: Arc<dyn AccountEraSeqStore>,
}

impl AccountEraSeqPersistorTask {
    pub fn new(account_era_seqs: Arc<dyn AccountEraSeqStore>) -> Self {
        Self { account_era_seqs }
    }
}

#[async_trait]
impl Task<Payload> for AccountEraSeqPersistorTask {
    fn name(&self) -> &'static str {
        ACCOUNT_ERA_SEQ_PERSISTOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        if !payload.syncable()?.last_in_era {
            log_skipped(self.name(), payload.current_height, "not last in era, skipping");
            return Ok(());
        }
        log_running(self.name(), payload.current_height);
        self.account_era_seqs
            .bulk_upsert(&payload.account_era_sequences)
            .await?;
        Ok(())
    }
}

/// Creates new aggregates first, then saves updated ones
pub struct ValidatorAggPersistorTask {
    validator_aggs: Arc<dyn ValidatorAggStore>,
}

impl ValidatorAggPersistorTask {
    pub fn new(validator_aggs: Arc<dyn ValidatorAggStore>) -> Self {
        Self { validator_aggs }
    }
}

#[async_trait]
impl Task<Payload> for ValidatorAggPersistorTask {
    fn name(&self) -> &'static str {
        VALIDATOR_AGG_PERSISTOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);

        for agg in &payload.new_validator_aggregates {
            self.validator_aggs.create(agg).await?;
        }
        for agg in &payload.updated_validator_aggregates {
            self.validator_aggs.save(agg).await?;
        }
        Ok(())
    }
}

pub struct EventSeqPersistorTask {
    event_seqs: Arc<dyn EventSeqStore>,
}

impl EventSeqPersistorTask {
    pub fn new(event_seqs: Arc<dyn EventSeqStore>) -> Self {
        Self { event_seqs }
    }
}

#[async_trait]
impl Task<Payload> for EventSeqPersistorTask {
    fn name(&self) -> &'static str {
        EVENT_SEQ_PERSISTOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);
        self.event_seqs.bulk_upsert(&payload.event_sequences).await?;
        Ok(())
    }
}

pub struct TransactionSeqPersistorTask {
    transaction_seqs: Arc<dyn TransactionSeqStore>,
}

impl TransactionSeqPersistorTask {
    pub fn new(transaction_seqs: Arc<dyn TransactionSeqStore>) -> Self {
        Self { transaction_seqs }
    }
}

#[async_trait]
impl Task<Payload> for TransactionSeqPersistorTask {
    fn name(&self) -> &'static str {
        TRANSACTION_SEQ_PERSISTOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);
        self.transaction_seqs
            .bulk_upsert(&payload.transaction_sequences)
            .await?;
        Ok(())
    }
}

pub struct ValidatorSeqPersistorTask {
    validator_seqs: Arc<dyn ValidatorSeqStore>,
}

impl ValidatorSeqPersistorTask {
    pub fn new(validator_seqs: Arc<dyn ValidatorSeqStore>) -> Self {
        Self { validator_seqs }
    }
}

#[async_trait]
impl Task<Payload> for ValidatorSeqPersistorTask {
    fn name(&self) -> &'static str {
        VALIDATOR_SEQ_PERSISTOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);
        self.validator_seqs
            .bulk_upsert(&payload.validator_sequences)
            .await?;
        Ok(())
    }
}

pub struct SystemEventPersistorTask {
    system_events: Arc<dyn SystemEventStore>,
}

impl SystemEventPersistorTask {
    pub fn new(system_events: Arc<dyn SystemEventStore>) -> Self {
        Self { system_events }
    }
}

#[async_trait]
impl Task<Payload> for SystemEventPersistorTask {
    fn name(&self) -> &'static str {
        SYSTEM_EVENT_PERSISTOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);
        self.system_events.bulk_upsert(&payload.system_events).await?;
        Ok(())
    }
}

/// Upserts the era's rewards, then flags the ones paid out at this height.
///
/// A failed claim leaves the upserted rows in place; rerunning the height is safe.
pub struct RewardEraSeqPersistorTask {
    rewards: Arc<dyn RewardStore>,
}

impl RewardEraSeqPersistorTask {
    pub fn new(rewards: Arc<dyn RewardStore>) -> Self {
        Self { rewards }
    }
}

#[async_trait]
impl Task<Payload> for RewardEraSeqPersistorTask {
    fn name(&self) -> &'static str {
        REWARD_ERA_SEQ_PERSISTOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);

        self.rewards.bulk_upsert(&payload.reward_era_sequences).await?;
        for claim in &payload.reward_claims {
            let marked = self.rewards.mark_all_claimed(claim).await?;
            logging::log_debug(&format!(
                "Marked {} rewards claimed [validator={}] [era={}]",
                marked, claim.validator_stash, claim.era
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::indexer::sequencer_tasks::tests::syncable;
    use crate::application::pipeline::HeightPayload;
    use crate::domain::models::{
        BlockSeq, Quantity, RewardClaim, RewardEraSeq, RewardKind, ValidatorAgg,
        ValidatorSessionSeq,
    };
    use crate::infrastructure::persistence::repositories::in_memory::{REWARDS, VALIDATOR_AGGS};
    use crate::infrastructure::persistence::InMemoryStore;

    fn payload_at(last_in_session: bool, last_in_era: bool) -> Payload {
        let mut payload = Payload::for_height(30);
        payload.syncable = Some(syncable(30, last_in_session, last_in_era));
        payload
    }

    fn reward(stash: &str, validator: &str, era: i64) -> RewardEraSeq {
        RewardEraSeq {
            sequence: syncable(30, true, true).sequence(),
            era,
            stash_account: stash.to_string(),
            validator_stash_account: validator.to_string(),
            kind: RewardKind::Reward,
            amount: Quantity::from(10u64),
            claimed: false,
        }
    }

    #[tokio::test]
    async fn test_syncer_persistor_is_idempotent() {
        let store = InMemoryStore::new();
        let task = SyncerPersistorTask::new(store.stores().syncables);
        let mut payload = payload_at(false, false);

        task.run(&mut payload).await.unwrap();
        task.run(&mut payload).await.unwrap();
        assert_eq!(store.syncables().len(), 1);
    }

    #[tokio::test]
    async fn test_block_seq_create_or_save() {
        let store = InMemoryStore::new();
        let task = BlockSeqPersistorTask::new(store.stores().block_seqs);
        let seq = BlockSeq {
            sequence: syncable(30, false, false).sequence(),
            extrinsics_count: 1,
            signed_extrinsics_count: 0,
            unsigned_extrinsics_count: 1,
        };

        let mut payload = payload_at(false, false);
        payload.updated_block_sequence = Some(seq.clone());
        // nothing to update yet
        assert!(task.run(&mut payload).await.is_err());

        payload.updated_block_sequence = None;
        payload.new_block_sequence = Some(seq.clone());
        task.run(&mut payload).await.unwrap();

        let mut updated = seq;
        updated.extrinsics_count = 4;
        payload.new_block_sequence = None;
        payload.updated_block_sequence = Some(updated);
        task.run(&mut payload).await.unwrap();
        assert_eq!(store.block_seqs()[0].extrinsics_count, 4);
    }

    #[tokio::test]
    async fn test_guarded_persistors_skip_without_writes() {
        let store = InMemoryStore::new();
        let stores = store.stores();
        let mut payload = payload_at(false, false);
        payload.validator_session_sequences = vec![ValidatorSessionSeq {
            sequence: syncable(30, false, false).sequence(),
            session: 10,
            stash_account: "a".to_string(),
            online: true,
        }];

        ValidatorSessionSeqPersistorTask::new(stores.validator_session_seqs.clone())
            .run(&mut payload)
            .await
            .unwrap();
        ValidatorEraSeqPersistorTask::new(stores.validator_era_seqs.clone())
            .run(&mut payload)
            .await
            .unwrap();
        AccountEraSeqPersistorTask::new(stores.account_era_seqs.clone())
            .run(&mut payload)
            .await
            .unwrap();
        assert!(store.validator_session_seqs().is_empty());

        payload.syncable = Some(syncable(30, true, false));
        ValidatorSessionSeqPersistorTask::new(stores.validator_session_seqs)
            .run(&mut payload)
            .await
            .unwrap();
        assert_eq!(store.validator_session_seqs().len(), 1);
    }

    #[tokio::test]
    async fn test_agg_persistor_creates_then_saves() {
        let store = InMemoryStore::new();
        let time = syncable(30, false, false).time;
        let mut existing = ValidatorAgg::first_observation("a", "A", 1, time, false, true);
        store.stores().validator_aggs.create(&existing).await.unwrap();
        existing.observe("A2", 30, time, false, true);

        let mut payload = payload_at(false, false);
        payload.new_validator_aggregates =
            vec![ValidatorAgg::first_observation("b", "B", 30, time, false, true)];
        payload.updated_validator_aggregates = vec![existing];

        ValidatorAggPersistorTask::new(store.stores().validator_aggs)
            .run(&mut payload)
            .await
            .unwrap();

        let aggs = store.validator_aggs();
        assert_eq!(aggs.len(), 2);
        assert_eq!(aggs[0].display_name, "A2");
    }

    #[tokio::test]
    async fn test_agg_persistor_surfaces_store_failure() {
        let store = InMemoryStore::new();
        store.fail_writes_to(VALIDATOR_AGGS);
        let time = syncable(30, false, false).time;

        let mut payload = payload_at(false, false);
        payload.new_validator_aggregates =
            vec![ValidatorAgg::first_observation("b", "B", 30, time, false, true)];

        let err = ValidatorAggPersistorTask::new(store.stores().validator_aggs)
            .run(&mut payload)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Db(_)));
    }

    #[tokio::test]
    async fn test_rewards_upserted_then_claimed() {
        let store = InMemoryStore::new();
        let task = RewardEraSeqPersistorTask::new(store.stores().rewards);

        let mut payload = payload_at(true, true);
        payload.reward_era_sequences = vec![reward("n1", "v1", 3), reward("n2", "v2", 3)];
        task.run(&mut payload).await.unwrap();

        // a later height pays out v1
        let mut later = payload_at(false, false);
        later.reward_claims = vec![RewardClaim {
            validator_stash: "v1".to_string(),
            era: 3,
        }];
        task.run(&mut later).await.unwrap();

        let claimed: Vec<_> = store
            .rewards()
            .iter()
            .map(|r| (r.validator_stash_account.clone(), r.claimed))
            .collect();
        assert_eq!(claimed, vec![("v1".to_string(), true), ("v2".to_string(), false)]);

        // reindexing the era keeps the claim
        task.run(&mut payload).await.unwrap();
        assert!(store.rewards().iter().any(|r| r.validator_stash_account == "v1" && r.claimed));
    }

    #[tokio::test]
    async fn test_reward_store_failure_is_surfaced() {
        let store = InMemoryStore::new();
        store.fail_writes_to(REWARDS);
        let mut payload = payload_at(true, true);
        payload.reward_era_sequences = vec![reward("n1", "v1", 3)];

        let err = RewardEraSeqPersistorTask::new(store.stores().rewards)
            .run(&mut payload)
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Db(_)));
    }
}
