//! Time-bucketed roll-ups of sequence records

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryInterval {
    Hourly,
    Daily,
}

impl SummaryInterval {
    pub const ALL: [SummaryInterval; 2] = [SummaryInterval::Hourly, SummaryInterval::Daily];

    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryInterval::Hourly => "hour",
            SummaryInterval::Daily => "day",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            SummaryInterval::Hourly => Duration::hours(1),
            SummaryInterval::Daily => Duration::days(1),
        }
    }

    /// Start of the bucket containing `time`
    pub fn bucket_start(&self, time: DateTime<Utc>) -> DateTime<Utc> {
        // Truncation only fails for durations beyond the timestamp range.
        time.duration_trunc(self.duration()).unwrap_or(time)
    }
}

impl fmt::Display for SummaryInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(SummaryInterval::Hourly),
            "day" => Ok(SummaryInterval::Daily),
            other => Err(format!("unknown summary interval: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub time_interval: SummaryInterval,
    pub time_bucket: DateTime<Utc>,
    pub index_version: i64,
    pub count: i64,
    /// Mean seconds between consecutive blocks in the bucket
    pub block_time_avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorSummary {
    pub time_interval: SummaryInterval,
    pub time_bucket: DateTime<Utc>,
    pub index_version: i64,
    pub stash_account: String,
    pub uptime_avg: f64,
    pub uptime_max: i64,
    pub uptime_min: i64,
}

/// Half-open time range `[start, end)` covered by consecutive summary buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ActivityPeriod {
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.start && time < self.end
    }
}

/// Merges bucket starts into contiguous activity periods.
///
/// `buckets` need not be sorted; duplicates are ignored.
pub fn activity_periods(buckets: &[DateTime<Utc>], interval: SummaryInterval) -> Vec<ActivityPeriod> {
    let mut sorted = buckets.to_vec();
    sorted.sort();
    sorted.dedup();

    let step = interval.duration();
    let mut periods: Vec<ActivityPeriod> = Vec::new();
    for bucket in sorted {
        match periods.last_mut() {
            Some(period) if period.end == bucket => period.end = bucket + step,
            _ => periods.push(ActivityPeriod {
                start: bucket,
                end: bucket + step,
            }),
        }
    }
    periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_bucket_start_truncates() {
        let t = Utc.with_ymd_and_hms(2024, 3, 5, 13, 47, 12).unwrap();
        assert_eq!(
            SummaryInterval::Hourly.bucket_start(t),
            Utc.with_ymd_and_hms(2024, 3, 5, 13, 0, 0).unwrap()
        );
        assert_eq!(SummaryInterval::Daily.bucket_start(t), day(5));
    }

    #[test]
    fn test_activity_periods_merge_consecutive_buckets() {
        let periods = activity_periods(&[day(3), day(1), day(2), day(5), day(2)], SummaryInterval::Daily);
        assert_eq!(
            periods,
            vec![
                ActivityPeriod { start: day(1), end: day(4) },
                ActivityPeriod { start: day(5), end: day(6) },
            ]
        );
    }

    #[test]
    fn test_activity_period_is_half_open() {
        let period = ActivityPeriod { start: day(1), end: day(2) };
        assert!(period.contains(day(1)));
        assert!(!period.contains(day(2)));
    }
}
