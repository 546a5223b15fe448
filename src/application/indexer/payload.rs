use std::collections::BTreeMap;

use crate::application::pipeline::HeightPayload;
use crate::application::pipeline::TaskError;
use crate::domain::models::{
    AccountEraSeq, BlockSeq, EventSeq, Quantity, RawHeightData, RawStaker, RewardClaim,
    RewardEraSeq, Syncable, SystemEvent, TransactionSeq, ValidatorAgg, ValidatorEraSeq,
    ValidatorSeq, ValidatorSessionSeq,
};

/// Extrinsic counts of one block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBlock {
    pub extrinsics_count: i64,
    pub signed_extrinsics_count: i64,
    pub unsigned_extrinsics_count: i64,
}

/// Session performance reported for an active validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPerformance {
    pub online: bool,
    pub active_balance: Quantity,
}

/// Era exposure of a validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStaking {
    pub controller_account: String,
    pub total_stake: Quantity,
    pub own_stake: Quantity,
    pub reward_points: i64,
    pub commission: i64,
    pub stakers: Vec<RawStaker>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedValidator {
    pub stash_account: String,
    pub display_name: String,
    /// Set when the validator is in the active set at this height
    pub performance: Option<ParsedPerformance>,
    /// Set at era-final heights when the validator was exposed in the era
    pub staking: Option<ParsedStaking>,
}

/// Everything the stages of one height pass to each other
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub current_height: i64,

    // Syncer
    pub syncable: Option<Syncable>,

    // Fetcher
    pub raw: Option<RawHeightData>,

    // Parser
    pub parsed_block: Option<ParsedBlock>,
    pub parsed_validators: BTreeMap<String, ParsedValidator>,
    pub reward_claims: Vec<RewardClaim>,

    // Sequencer
    pub new_block_sequence: Option<BlockSeq>,
    pub updated_block_sequence: Option<BlockSeq>,
    pub validator_session_sequences: Vec<ValidatorSessionSeq>,
    pub validator_era_sequences: Vec<ValidatorEraSeq>,
    pub validator_sequences: Vec<ValidatorSeq>,
    pub event_sequences: Vec<EventSeq>,
    pub account_era_sequences: Vec<AccountEraSeq>,
    pub transaction_sequences: Vec<TransactionSeq>,
    pub reward_era_sequences: Vec<RewardEraSeq>,
    pub system_events: Vec<SystemEvent>,

    // Aggregator
    pub new_validator_aggregates: Vec<ValidatorAgg>,
    pub updated_validator_aggregates: Vec<ValidatorAgg>,
}

impl HeightPayload for Payload {
    fn for_height(height: i64) -> Self {
        Payload {
            current_height: height,
            ..Default::default()
        }
    }
}

impl Payload {
    pub fn syncable(&self) -> Result<&Syncable, TaskError> {
        self.syncable
            .as_ref()
            .ok_or(TaskError::MissingPayload("syncable"))
    }

    pub fn raw(&self) -> Result<&RawHeightData, TaskError> {
        self.raw.as_ref().ok_or(TaskError::MissingPayload("raw"))
    }

    /// Validators in the active set at this height
    pub fn active_validators(&self) -> impl Iterator<Item = (&ParsedValidator, &ParsedPerformance)> {
        self.parsed_validators
            .values()
            .filter_map(|v| v.performance.as_ref().map(|p| (v, p)))
    }

    /// Validators exposed in the era closed at this height
    pub fn staked_validators(&self) -> impl Iterator<Item = (&ParsedValidator, &ParsedStaking)> {
        self.parsed_validators
            .values()
            .filter_map(|v| v.staking.as_ref().map(|s| (v, s)))
    }
}
