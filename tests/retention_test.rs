mod common;

use chrono::{Duration, TimeZone, Utc};
use tokio_util::sync::CancellationToken;

use common::{Harness, ScriptedChain};
use polkadothub_indexer::application::error::IndexingError;
use polkadothub_indexer::application::usecase::{
    PurgeOutcome, PurgeUseCase, StartUseCase, SummarizeUseCase,
};
use polkadothub_indexer::config::PurgeConfig;
use polkadothub_indexer::domain::models::SummaryInterval;

/// Twelve heights four hours apart, from 04:00 on Jan 1 to 00:00 on Jan 3
async fn indexed_over_two_days() -> Harness {
    let harness = Harness::new(ScriptedChain::with_block_time(12, Duration::hours(4)));
    StartUseCase::new(harness.pipeline(1, 1), harness.stores.reports.clone())
        .execute(&CancellationToken::new(), 0)
        .await
        .unwrap();
    harness
}

fn purge_config(sequences: &str, hourly_summaries: &str) -> PurgeConfig {
    PurgeConfig {
        sequences_interval: sequences.to_string(),
        hourly_summaries_interval: hourly_summaries.to_string(),
    }
}

#[tokio::test]
async fn test_summarize_rolls_up_closed_buckets() {
    let harness = indexed_over_two_days().await;
    let now = Utc.with_ymd_and_hms(2024, 1, 3, 1, 0, 0).unwrap();

    let report = SummarizeUseCase::new(harness.stores.clone(), 1)
        .execute_at(now)
        .await
        .unwrap();

    // one hourly bucket per block plus two closed days
    assert_eq!(report.block_summaries, 14);
    // six sessions hourly, then two days of two and three validators
    assert_eq!(report.validator_summaries, 21);

    let daily: Vec<_> = harness
        .memory
        .block_summaries()
        .into_iter()
        .filter(|s| s.time_interval == SummaryInterval::Daily)
        .collect();
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0].count, 5);
    assert_eq!(daily[0].block_time_avg, 4.0 * 3600.0);
    assert_eq!(daily[1].count, 6);

    // rerunning only recomputes the most recent buckets
    let again = SummarizeUseCase::new(harness.stores.clone(), 1)
        .execute_at(now)
        .await
        .unwrap();
    assert_eq!(again.block_summaries, 2);
    assert_eq!(harness.memory.block_summaries().len(), 14);
}

#[tokio::test]
async fn test_purge_keeps_what_summaries_do_not_cover() {
    let harness = indexed_over_two_days().await;
    SummarizeUseCase::new(harness.stores.clone(), 1)
        .execute_at(Utc.with_ymd_and_hms(2024, 1, 3, 1, 0, 0).unwrap())
        .await
        .unwrap();

    let report = PurgeUseCase::new(harness.stores.clone(), purge_config("12h", "1day"), 1)
        .execute()
        .await
        .unwrap();

    // 12h before the last block lands past the last daily summary, so Jan 1 only
    assert_eq!(report.block_seqs, PurgeOutcome::Purged(5));
    assert_eq!(harness.memory.block_seqs().len(), 7);
    assert_eq!(report.block_summaries, PurgeOutcome::Purged(5));

    // Jan 2 12:00 is older than the last validator summary
    assert_eq!(report.validator_session_seqs, PurgeOutcome::Purged(10));
    assert_eq!(report.validator_summaries, PurgeOutcome::Purged(4));
    let kept_daily = harness
        .memory
        .validator_summaries()
        .into_iter()
        .filter(|s| s.time_interval == SummaryInterval::Daily)
        .count();
    assert_eq!(kept_daily, 5);
}

#[tokio::test]
async fn test_purge_without_summaries_keeps_sequences() {
    let harness = indexed_over_two_days().await;

    let report = PurgeUseCase::new(harness.stores.clone(), purge_config("1h", "1h"), 1)
        .execute()
        .await
        .unwrap();

    assert_eq!(report.block_seqs, PurgeOutcome::Purged(0));
    assert_eq!(report.validator_session_seqs, PurgeOutcome::Purged(0));
    assert_eq!(harness.memory.block_seqs().len(), 12);
    assert_eq!(harness.memory.validator_session_seqs().len(), 16);
}

#[tokio::test]
async fn test_zero_interval_disables_purging() {
    let harness = indexed_over_two_days().await;

    let report = PurgeUseCase::new(harness.stores.clone(), purge_config("0s", "0s"), 1)
        .execute()
        .await
        .unwrap();

    assert_eq!(report.block_seqs, PurgeOutcome::Disabled);
    assert_eq!(report.block_summaries, PurgeOutcome::Disabled);
    assert_eq!(report.validator_session_seqs, PurgeOutcome::Disabled);
    assert_eq!(report.validator_summaries, PurgeOutcome::Disabled);
}

#[tokio::test]
async fn test_invalid_interval_is_an_error() {
    let harness = indexed_over_two_days().await;

    let err = PurgeUseCase::new(harness.stores.clone(), purge_config("forever", "1h"), 1)
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, IndexingError::InvalidPurgeInterval { .. }));
}
