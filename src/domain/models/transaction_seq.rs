use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Sequence;

/// Signed extrinsic included at a height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSeq {
    pub sequence: Sequence,
    pub index: i64,
    pub hash: String,
    pub signer: String,
    pub section: String,
    pub method: String,
    pub is_success: bool,
    pub args: Value,
}
