use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Quantity, Sequence};

/// Which part of an era payout a reward row represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// Validator commission taken before the payout is split
    Commission,
    /// Share of the leftover payout proportional to exposure
    Reward,
}

impl RewardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardKind::Commission => "commission",
            RewardKind::Reward => "reward",
        }
    }
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reward owed to one account through one validator for one era
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEraSeq {
    pub sequence: Sequence,
    pub era: i64,
    pub stash_account: String,
    pub validator_stash_account: String,
    pub kind: RewardKind,
    pub amount: Quantity,
    pub claimed: bool,
}

/// A payout of `era` rewards triggered for `validator_stash`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewardClaim {
    pub validator_stash: String,
    pub era: i64,
}
