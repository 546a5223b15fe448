use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// First and most recent observation of an aggregated entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub started_at_height: i64,
    pub started_at: DateTime<Utc>,
    pub recent_at_height: i64,
    pub recent_at: DateTime<Utc>,
}

/// Running per-validator state folded from every indexed height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorAgg {
    pub aggregate: Aggregate,
    pub stash_account: String,
    pub display_name: String,
    /// Session-final heights at which the validator reported online
    pub accumulated_uptime: i64,
    /// Session-final heights at which the validator was observed at all
    pub accumulated_uptime_count: i64,
    pub recent_as_validator_height: i64,
}

impl ValidatorAgg {
    /// Starts an aggregate from its first observation.
    ///
    /// Uptime counters only start moving when the height closes a session.
    pub fn first_observation(
        stash_account: &str,
        display_name: &str,
        height: i64,
        time: DateTime<Utc>,
        last_in_session: bool,
        online: bool,
    ) -> Self {
        let (accumulated_uptime, accumulated_uptime_count) = if last_in_session {
            (i64::from(online), 1)
        } else {
            (0, 0)
        };

        Self {
            aggregate: Aggregate {
                started_at_height: height,
                started_at: time,
                recent_at_height: height,
                recent_at: time,
            },
            stash_account: stash_account.to_string(),
            display_name: display_name.to_string(),
            accumulated_uptime,
            accumulated_uptime_count,
            recent_as_validator_height: height,
        }
    }

    /// Folds a later observation into the aggregate
    pub fn observe(
        &mut self,
        display_name: &str,
        height: i64,
        time: DateTime<Utc>,
        last_in_session: bool,
        online: bool,
    ) {
        self.aggregate.recent_at_height = height;
        self.aggregate.recent_at = time;
        self.recent_as_validator_height = height;
        self.display_name = display_name.to_string();

        if last_in_session {
            if online {
                self.accumulated_uptime += 1;
            }
            self.accumulated_uptime_count += 1;
        }
    }
}
