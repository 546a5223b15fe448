use async_trait::async_trait;
use std::sync::Arc;

use crate::application::indexer::payload::Payload;
use crate::application::pipeline::{StageName, Task};
use crate::application::pipeline::TaskError;
use crate::domain::models::{
    AccountEraSeq, BlockSeq, EventSeq, TransactionSeq, ValidatorEraSeq, ValidatorSeq,
    ValidatorSessionSeq,
};
use crate::infrastructure::persistence::stores::BlockSeqStore;
use crate::utils::logging;

pub const BLOCK_SEQ_CREATOR_TASK_NAME: &str = "BlockSeqCreator";
pub const VALIDATOR_SESSION_SEQ_CREATOR_TASK_NAME: &str = "ValidatorSessionSeqCreator";
pub const VALIDATOR_ERA_SEQ_CREATOR_TASK_NAME: &str = "ValidatorEraSeqCreator";
pub const EVENT_SEQ_CREATOR_TASK_NAME: &str = "EventSeqCreator";
pub const ACCOUNT_ERA_SEQ_CREATOR_TASK_NAME: &str = "AccountEraSeqCreator";
pub const TRANSACTION_SEQ_CREATOR_TASK_NAME: &str = "TransactionSeqCreator";
pub const VALIDATOR_SEQ_CREATOR_TASK_NAME: &str = "ValidatorSeqCreator";

fn log_running(task: &'static str, height: i64) {
    logging::log_task(StageName::Sequencer.as_str(), task, height, "running indexer task");
}

/// Builds the block sequence, as an update when the height was indexed before
pub struct BlockSeqCreatorTask {
    block_seqs: Arc<dyn BlockSeqStore>,
}

impl BlockSeqCreatorTask {
    pub fn new(block_seqs: Arc<dyn BlockSeqStore>) -> Self {
        Self { block_seqs }
    }
}

#[async_trait]
impl Task<Payload> for BlockSeqCreatorTask {
    fn name(&self) -> &'static str {
        BLOCK_SEQ_CREATOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);

        let sequence = payload.syncable()?.sequence();
        let parsed = payload
            .parsed_block
            .clone()
            .ok_or(TaskError::MissingPayload("parsed_block"))?;

        let seq = BlockSeq {
            sequence,
            extrinsics_count: parsed.extrinsics_count,
            signed_extrinsics_count: parsed.signed_extrinsics_count,
            unsigned_extrinsics_count: parsed.unsigned_extrinsics_count,
        };

        match self.block_seqs.find_by_height(payload.current_height).await? {
            Some(_) => payload.updated_block_sequence = Some(seq),
            None => payload.new_block_sequence = Some(seq),
        }
        Ok(())
    }
}

/// Records each active validator's online flag at session-final heights
pub struct ValidatorSessionSeqCreatorTask;

#[async_trait]
impl Task<Payload> for ValidatorSessionSeqCreatorTask {
    fn name(&self) -> &'static str {
        VALIDATOR_SESSION_SEQ_CREATOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);

        let syncable = payload.syncable()?;
        if !syncable.last_in_session {
            return Ok(());
        }

        let sequence = syncable.sequence();
        let session = syncable.session;
        let seqs = payload
            .active_validators()
            .map(|(validator, performance)| ValidatorSessionSeq {
                sequence,
                session,
                stash_account: validator.stash_account.clone(),
                online: performance.online,
            })
            .collect();

        payload.validator_session_sequences = seqs;
        Ok(())
    }
}

/// Records each validator's era exposure at era-final heights
pub struct ValidatorEraSeqCreatorTask;

#[async_trait]
impl Task<Payload> for ValidatorEraSeqCreatorTask {
    fn name(&self) -> &'static str {
        VALIDATOR_ERA_SEQ_CREATOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);

        let syncable = payload.syncable()?;
        if !syncable.last_in_era {
            return Ok(());
        }
        if payload.raw()?.staking.is_none() {
            return Err(TaskError::MissingPayload("staking"));
        }

        let sequence = syncable.sequence();
        let era = syncable.era;
        let seqs = payload
            .staked_validators()
            .map(|(validator, staking)| ValidatorEraSeq {
                sequence,
                era,
                stash_account: validator.stash_account.clone(),
                controller_account: staking.controller_account.clone(),
                total_stake: staking.total_stake.clone(),
                own_stake: staking.own_stake.clone(),
                stakers_count: staking.stakers.len() as i64,
                reward_points: staking.reward_points,
                commission: staking.commission,
            })
            .collect();

        payload.validator_era_sequences = seqs;
        Ok(())
    }
}

/// Records each nominator's stake behind a validator at era-final heights
pub struct AccountEraSeqCreatorTask;

#[async_trait]
impl Task<Payload> for AccountEraSeqCreatorTask {
    fn name(&self) -> &'static str {
        ACCOUNT_ERA_SEQ_CREATOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);

        let syncable = payload.syncable()?;
        if !syncable.last_in_era {
            return Ok(());
        }
        if payload.raw()?.staking.is_none() {
            return Err(TaskError::MissingPayload("staking"));
        }

        let sequence = syncable.sequence();
        let era = syncable.era;
        let seqs = payload
            .staked_validators()
            .flat_map(|(validator, staking)| {
                staking.stakers.iter().map(move |staker| AccountEraSeq {
                    sequence,
                    era,
                    stash_account: staker.stash_account.clone(),
                    validator_stash_account: validator.stash_account.clone(),
                    stake: staker.stake.clone(),
                })
            })
            .collect();

        payload.account_era_sequences = seqs;
        Ok(())
    }
}

pub struct EventSeqCreatorTask;

#[async_trait]
impl Task<Payload> for EventSeqCreatorTask {
    fn name(&self) -> &'static str {
        EVENT_SEQ_CREATOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);

        let sequence = payload.syncable()?.sequence();
        let seqs = payload
            .raw()?
            .events
            .iter()
            .map(|event| EventSeq {
                sequence,
                index: event.index,
                extrinsic_index: event.extrinsic_index,
                section: event.section.clone(),
                method: event.method.clone(),
                phase: event.phase.clone(),
                data: event.data.clone(),
            })
            .collect();

        payload.event_sequences = seqs;
        Ok(())
    }
}

/// Signed extrinsics only; inherents are not transactions
pub struct TransactionSeqCreatorTask;

#[async_trait]
impl Task<Payload> for TransactionSeqCreatorTask {
    fn name(&self) -> &'static str {
        TRANSACTION_SEQ_CREATOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);

        let sequence = payload.syncable()?.sequence();
        let seqs = payload
            .raw()?
            .block
            .extrinsics
            .iter()
            .filter(|extrinsic| extrinsic.is_signed)
            .map(|extrinsic| TransactionSeq {
                sequence,
                index: extrinsic.index,
                hash: extrinsic.hash.clone(),
                signer: extrinsic.signer.clone(),
                section: extrinsic.section.clone(),
                method: extrinsic.method.clone(),
                is_success: extrinsic.is_success,
                args: extrinsic.args.clone(),
            })
            .collect();

        payload.transaction_sequences = seqs;
        Ok(())
    }
}

/// Records every active validator at every height
pub struct ValidatorSeqCreatorTask;

#[async_trait]
impl Task<Payload> for ValidatorSeqCreatorTask {
    fn name(&self) -> &'static str {
        VALIDATOR_SEQ_CREATOR_TASK_NAME
    }

    async fn run(&self, payload: &mut Payload) -> Result<(), TaskError> {
        log_running(self.name(), payload.current_height);

        let sequence = payload.syncable()?.sequence();
        let seqs = payload
            .active_validators()
            .map(|(validator, performance)| ValidatorSeq {
                sequence,
                stash_account: validator.stash_account.clone(),
                active_balance: performance.active_balance.clone(),
            })
            .collect();

        payload.validator_sequences = seqs;
        Ok(())
    }
}
