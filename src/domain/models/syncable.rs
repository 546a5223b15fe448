use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One processed height. The height is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syncable {
    pub height: i64,
    pub session: i64,
    pub era: i64,
    pub last_in_session: bool,
    pub last_in_era: bool,
    pub spec_version: String,
    /// Generation of the indexing logic that produced this row
    pub index_version: i64,
    /// Block timestamp reported by the chain
    pub time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Height and timestamp shared by every sequence record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub height: i64,
    pub time: DateTime<Utc>,
}

impl Syncable {
    pub fn sequence(&self) -> Sequence {
        Sequence {
            height: self.height,
            time: self.time,
        }
    }
}
