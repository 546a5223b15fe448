//! Rolls sequences into hourly and daily summaries.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::application::error::IndexingError;
use crate::domain::models::{BlockSeq, BlockSummary, SummaryInterval, ValidatorSessionSeq, ValidatorSummary};
use crate::infrastructure::persistence::Stores;
use crate::utils::logging;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummarizeReport {
    pub block_summaries: u64,
    pub validator_summaries: u64,
}

pub struct SummarizeUseCase {
    stores: Stores,
    index_version: i64,
}

impl SummarizeUseCase {
    pub fn new(stores: Stores, index_version: i64) -> Self {
        Self {
            stores,
            index_version,
        }
    }

    pub async fn execute(&self) -> Result<SummarizeReport, IndexingError> {
        self.execute_at(Utc::now()).await
    }

    /// Summarizes every complete bucket before `now`. The most recent stored
    /// bucket is recomputed since it may have been written while still open.
    pub async fn execute_at(&self, now: DateTime<Utc>) -> Result<SummarizeReport, IndexingError> {
        let mut report = SummarizeReport::default();
        for interval in SummaryInterval::ALL {
            report.block_summaries += self.summarize_blocks(interval, now).await?;
            report.validator_summaries += self.summarize_validators(interval, now).await?;
        }
        logging::log_info(&format!(
            "Summarize finished [block_summaries={}] [validator_summaries={}]",
            report.block_summaries, report.validator_summaries
        ));
        Ok(report)
    }

    async fn summarize_blocks(&self, interval: SummaryInterval, now: DateTime<Utc>) -> Result<u64, IndexingError> {
        let from = match self
            .stores
            .block_summaries
            .find_most_recent_by_interval(interval)
            .await?
        {
            Some(summary) => summary.time_bucket,
            None => match self.stores.block_seqs.find_first().await? {
                Some(seq) => interval.bucket_start(seq.sequence.time),
                None => return Ok(0),
            },
        };
        let until = interval.bucket_start(now);

        let mut written = 0;
        let mut bucket = from;
        while bucket < until {
            let next = bucket + interval.duration();
            let seqs = self.stores.block_seqs.find_between(bucket, next).await?;
            if let Some(summary) = block_summary(interval, bucket, self.index_version, &seqs) {
                self.stores.block_summaries.upsert(&summary).await?;
                written += 1;
            }
            bucket = next;
        }

        logging::log_debug(&format!(
            "{} block summaries written [interval={}] [from={}] [until={}]",
            written, interval, from, until
        ));
        Ok(written)
    }

    async fn summarize_validators(
        &self,
        interval: SummaryInterval,
        now: DateTime<Utc>,
    ) -> Result<u64, IndexingError> {
        let from = match self
            .stores
            .validator_summaries
            .find_most_recent_by_interval(interval)
            .await?
        {
            Some(summary) => summary.time_bucket,
            None => match self.stores.validator_session_seqs.find_first().await? {
                Some(seq) => interval.bucket_start(seq.sequence.time),
                None => return Ok(0),
            },
        };
        let until = interval.bucket_start(now);

        let mut written = 0;
        let mut bucket = from;
        while bucket < until {
            let next = bucket + interval.duration();
            let seqs = self.stores.validator_session_seqs.find_between(bucket, next).await?;
            for summary in validator_summaries(interval, bucket, self.index_version, &seqs) {
                self.stores.validator_summaries.upsert(&summary).await?;
                written += 1;
            }
            bucket = next;
        }

        logging::log_debug(&format!(
            "{} validator summaries written [interval={}] [from={}] [until={}]",
            written, interval, from, until
        ));
        Ok(written)
    }
}

/// `None` when the bucket holds no blocks
fn block_summary(
    interval: SummaryInterval,
    bucket: DateTime<Utc>,
    index_version: i64,
    seqs: &[BlockSeq],
) -> Option<BlockSummary> {
    let first = seqs.first()?;
    let last = seqs.last()?;
    let count = seqs.len() as i64;

    let block_time_avg = if count < 2 {
        0.0
    } else {
        let span = (last.sequence.time - first.sequence.time).num_milliseconds() as f64 / 1000.0;
        span / (count - 1) as f64
    };

    Some(BlockSummary {
        time_interval: interval,
        time_bucket: bucket,
        index_version,
        count,
        block_time_avg,
    })
}

/// One summary per validator; each session counts as 1 when online, else 0
fn validator_summaries(
    interval: SummaryInterval,
    bucket: DateTime<Utc>,
    index_version: i64,
    seqs: &[ValidatorSessionSeq],
) -> Vec<ValidatorSummary> {
    let mut uptimes: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
    for seq in seqs {
        uptimes
            .entry(seq.stash_account.as_str())
            .or_default()
            .push(i64::from(seq.online));
    }

    uptimes
        .into_iter()
        .map(|(stash, values)| {
            let sum: i64 = values.iter().sum();
            ValidatorSummary {
                time_interval: interval,
                time_bucket: bucket,
                index_version,
                stash_account: stash.to_string(),
                uptime_avg: sum as f64 / values.len() as f64,
                uptime_max: values.iter().copied().max().unwrap_or(0),
                uptime_min: values.iter().copied().min().unwrap_or(0),
            }
        })
        .collect()
}
