use serde::{Deserialize, Serialize};

use super::{Quantity, Sequence};

/// Validator performance for one session, written at the session-final height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSessionSeq {
    pub sequence: Sequence,
    pub session: i64,
    pub stash_account: String,
    pub online: bool,
}

/// Validator staking exposure for one era, written at the era-final height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorEraSeq {
    pub sequence: Sequence,
    pub era: i64,
    pub stash_account: String,
    pub controller_account: String,
    pub total_stake: Quantity,
    pub own_stake: Quantity,
    pub stakers_count: i64,
    pub reward_points: i64,
    /// Commission in parts per billion
    pub commission: i64,
}

/// Active validator observed at a height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSeq {
    pub sequence: Sequence,
    pub stash_account: String,
    pub active_balance: Quantity,
}
