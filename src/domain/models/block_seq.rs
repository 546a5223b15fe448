use serde::{Deserialize, Serialize};

use super::Sequence;

/// Per-height block statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSeq {
    pub sequence: Sequence,
    pub extrinsics_count: i64,
    pub signed_extrinsics_count: i64,
    pub unsigned_extrinsics_count: i64,
}
