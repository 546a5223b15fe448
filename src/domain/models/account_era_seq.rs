use serde::{Deserialize, Serialize};

use super::{Quantity, Sequence};

/// Nominator stake behind one validator for one era
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEraSeq {
    pub sequence: Sequence,
    pub era: i64,
    pub stash_account: String,
    pub validator_stash_account: String,
    pub stake: Quantity,
}
