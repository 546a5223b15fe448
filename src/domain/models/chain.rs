//! Raw chain data as returned by the chain proxy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Quantity;

/// Node and chain metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStatus {
    pub chain_name: String,
    pub chain_type: String,
    pub node_name: String,
    pub node_version: String,
    pub node_health: String,
    pub genesis_hash: String,
}

/// Session and era placement of a height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightMeta {
    pub height: i64,
    pub time: DateTime<Utc>,
    pub session: i64,
    pub era: i64,
    pub last_in_session: bool,
    pub last_in_era: bool,
    pub spec_version: String,
}

/// Everything the pipeline reads from the chain for one height
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHeightData {
    pub block: RawBlock,
    #[serde(default)]
    pub events: Vec<RawEvent>,
    #[serde(default)]
    pub validators: Vec<RawValidatorPerformance>,
    /// Present at era-final heights
    #[serde(default)]
    pub staking: Option<RawStaking>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlock {
    pub hash: String,
    pub parent_hash: String,
    #[serde(default)]
    pub extrinsics: Vec<RawExtrinsic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExtrinsic {
    pub index: i64,
    pub hash: String,
    pub is_signed: bool,
    #[serde(default)]
    pub signer: String,
    pub section: String,
    pub method: String,
    pub is_success: bool,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub index: i64,
    pub extrinsic_index: i64,
    pub section: String,
    pub method: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawValidatorPerformance {
    pub stash_account: String,
    #[serde(default)]
    pub display_name: String,
    pub online: bool,
    #[serde(default)]
    pub active_balance: Quantity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStaking {
    pub era: i64,
    pub total_reward_points: i64,
    /// Decimal string; validated by the rewards calculator
    pub total_reward_payout: String,
    #[serde(default)]
    pub validators: Vec<RawStakingValidator>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStakingValidator {
    pub stash_account: String,
    #[serde(default)]
    pub controller_account: String,
    pub total_stake: Quantity,
    pub own_stake: Quantity,
    pub reward_points: i64,
    /// Parts per billion
    pub commission: i64,
    #[serde(default)]
    pub stakers: Vec<RawStaker>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStaker {
    pub stash_account: String,
    pub stake: Quantity,
}
