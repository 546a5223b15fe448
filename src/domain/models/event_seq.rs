use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::Sequence;

/// Runtime event emitted at a height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSeq {
    pub sequence: Sequence,
    pub index: i64,
    pub extrinsic_index: i64,
    pub section: String,
    pub method: String,
    pub phase: String,
    pub data: Value,
}

/// Kind of an indexer-derived system event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemEventKind {
    JoinedSet,
    LeftSet,
}

impl SystemEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemEventKind::JoinedSet => "joined_set",
            SystemEventKind::LeftSet => "left_set",
        }
    }
}

impl fmt::Display for SystemEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "joined_set" => Ok(SystemEventKind::JoinedSet),
            "left_set" => Ok(SystemEventKind::LeftSet),
            other => Err(format!("unknown system event kind: {}", other)),
        }
    }
}

/// Event derived by the indexer rather than emitted by the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemEvent {
    pub sequence: Sequence,
    pub actor: String,
    pub kind: SystemEventKind,
    pub data: Value,
}
