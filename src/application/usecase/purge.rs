//! Retention of sequences and hourly summaries.
//!
//! Sequences are only removed once summaries cover them, so purging never
//! loses data the read side still needs.

use chrono::{DateTime, Duration, Utc};

use crate::application::error::IndexingError;
use crate::config::PurgeConfig;
use crate::domain::models::SummaryInterval;
use crate::infrastructure::persistence::Stores;
use crate::utils::logging;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Retention interval is zero
    Disabled,
    Purged(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    pub block_seqs: PurgeOutcome,
    pub block_summaries: PurgeOutcome,
    pub validator_session_seqs: PurgeOutcome,
    pub validator_summaries: PurgeOutcome,
}

/// Parses a retention interval such as `24h` or `7days`. Zero disables purging.
pub fn parse_retention(value: &str) -> Result<Option<Duration>, IndexingError> {
    let invalid = |reason: String| IndexingError::InvalidPurgeInterval {
        value: value.to_string(),
        reason,
    };

    let parsed = humantime::parse_duration(value.trim()).map_err(|e| invalid(e.to_string()))?;
    if parsed.is_zero() {
        return Ok(None);
    }
    Duration::from_std(parsed)
        .map(Some)
        .map_err(|e| invalid(e.to_string()))
}

/// `last_seq_time - retention`, never later than the most recent summary bucket
pub fn purge_threshold(
    last_seq_time: DateTime<Utc>,
    retention: Duration,
    last_summary_bucket: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    let threshold = last_seq_time - retention;
    match last_summary_bucket {
        Some(bucket) => threshold.min(bucket),
        None => threshold,
    }
}

pub struct PurgeUseCase {
    stores: Stores,
    config: PurgeConfig,
    index_version: i64,
}

impl PurgeUseCase {
    pub fn new(stores: Stores, config: PurgeConfig, index_version: i64) -> Self {
        Self {
            stores,
            config,
            index_version,
        }
    }

    pub async fn execute(&self) -> Result<PurgeReport, IndexingError> {
        let sequences = parse_retention(&self.config.sequences_interval)?;
        let hourly_summaries = parse_retention(&self.config.hourly_summaries_interval)?;

        let report = PurgeReport {
            block_seqs: self.purge_block_seqs(sequences).await?,
            block_summaries: self.purge_block_summaries(hourly_summaries).await?,
            validator_session_seqs: self.purge_validator_session_seqs(sequences).await?,
            validator_summaries: self.purge_validator_summaries(hourly_summaries).await?,
        };
        logging::log_info(&format!("Purge finished: {:?}", report));
        Ok(report)
    }

    async fn purge_block_seqs(&self, retention: Option<Duration>) -> Result<PurgeOutcome, IndexingError> {
        let Some(retention) = retention else {
            logging::log_info("Purging block sequences disabled, purge interval set to 0");
            return Ok(PurgeOutcome::Disabled);
        };
        let Some(last_seq) = self.stores.block_seqs.find_most_recent().await? else {
            return Ok(PurgeOutcome::Purged(0));
        };

        let last_summary = self
            .stores
            .block_summaries
            .find_most_recent_by_interval(SummaryInterval::Daily)
            .await?
            .map(|summary| summary.time_bucket);
        let threshold = purge_threshold(last_seq.sequence.time, retention, last_summary);

        let periods = self
            .stores
            .block_summaries
            .find_activity_periods(SummaryInterval::Daily, self.index_version)
            .await?;

        logging::log_info(&format!(
            "Purging summarized block sequences [older_than={}] [periods={}]",
            threshold,
            periods.len()
        ));
        let deleted = self.stores.block_seqs.delete_older_than(threshold, &periods).await?;
        logging::log_info(&format!("{} block sequences purged", deleted));
        Ok(PurgeOutcome::Purged(deleted))
    }

    async fn purge_block_summaries(&self, retention: Option<Duration>) -> Result<PurgeOutcome, IndexingError> {
        let interval = SummaryInterval::Hourly;
        let Some(retention) = retention else {
            logging::log_info(&format!("Purging block summaries disabled [interval={}]", interval));
            return Ok(PurgeOutcome::Disabled);
        };
        let Some(last) = self
            .stores
            .block_summaries
            .find_most_recent_by_interval(interval)
            .await?
        else {
            return Ok(PurgeOutcome::Purged(0));
        };

        let threshold = last.time_bucket - retention;
        let deleted = self
            .stores
            .block_summaries
            .delete_older_than(interval, threshold)
            .await?;
        logging::log_info(&format!(
            "{} block summaries purged [interval={}] [older_than={}]",
            deleted, interval, threshold
        ));
        Ok(PurgeOutcome::Purged(deleted))
    }

    async fn purge_validator_session_seqs(
        &self,
        retention: Option<Duration>,
    ) -> Result<PurgeOutcome, IndexingError> {
        let Some(retention) = retention else {
            logging::log_info("Purging validator sequences disabled, purge interval set to 0");
            return Ok(PurgeOutcome::Disabled);
        };
        let Some(last_seq) = self.stores.validator_session_seqs.find_most_recent().await? else {
            return Ok(PurgeOutcome::Purged(0));
        };
        // nothing has been summarized yet
        let Some(last_summary) = self.stores.validator_summaries.find_most_recent().await? else {
            return Ok(PurgeOutcome::Purged(0));
        };

        let threshold = purge_threshold(
            last_seq.sequence.time,
            retention,
            Some(last_summary.time_bucket),
        );
        let deleted = self
            .stores
            .validator_session_seqs
            .delete_older_than(threshold)
            .await?;
        logging::log_info(&format!(
            "{} validator sequences purged [older_than={}]",
            deleted, threshold
        ));
        Ok(PurgeOutcome::Purged(deleted))
    }

    async fn purge_validator_summaries(
        &self,
        retention: Option<Duration>,
    ) -> Result<PurgeOutcome, IndexingError> {
        let interval = SummaryInterval::Hourly;
        let Some(retention) = retention else {
            logging::log_info(&format!("Purging validator summaries disabled [interval={}]", interval));
            return Ok(PurgeOutcome::Disabled);
        };
        let Some(last) = self
            .stores
            .validator_summaries
            .find_most_recent_by_interval(interval)
            .await?
        else {
            return Ok(PurgeOutcome::Purged(0));
        };

        let threshold = last.time_bucket - retention;
        let deleted = self
            .stores
            .validator_summaries
            .delete_older_than(interval, threshold)
            .await?;
        logging::log_info(&format!(
            "{} validator summaries purged [interval={}] [older_than={}]",
            deleted, interval, threshold
        ));
        Ok(PurgeOutcome::Purged(deleted))
    }
}
