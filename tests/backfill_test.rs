mod common;

use tokio_util::sync::CancellationToken;

use common::{Harness, ScriptedChain};
use polkadothub_indexer::application::error::IndexingError;
use polkadothub_indexer::application::pipeline::SourceError;
use polkadothub_indexer::application::usecase::{BackfillUseCase, BackfillUseCaseConfig, StartUseCase};
use polkadothub_indexer::config::ConfigError;
use polkadothub_indexer::domain::models::{Report, ReportKind, ReportStatus};

/// Indexes heights 1..=8 with index version 1
async fn indexed_with_version_one() -> Harness {
    let harness = Harness::new(ScriptedChain::new(8));
    StartUseCase::new(harness.pipeline(1, 1), harness.stores.reports.clone())
        .execute(&CancellationToken::new(), 0)
        .await
        .unwrap();
    harness
}

fn backfill(harness: &Harness, workers: usize) -> BackfillUseCase {
    BackfillUseCase::new(harness.pipeline(2, workers), harness.stores.reports.clone())
}

fn versions(harness: &Harness) -> Vec<(i64, i64)> {
    harness
        .memory
        .syncables()
        .iter()
        .map(|s| (s.height, s.index_version))
        .collect()
}

#[tokio::test]
async fn test_sequential_backfill_reindexes_every_outdated_height() {
    let harness = indexed_with_version_one().await;

    let summary = backfill(&harness, 1)
        .execute(&CancellationToken::new(), BackfillUseCaseConfig::default())
        .await
        .unwrap();
    assert_eq!(summary.processed, 8);
    assert!(versions(&harness).iter().all(|(_, version)| *version == 2));

    let report = harness
        .memory
        .reports()
        .into_iter()
        .find(|r| r.kind == ReportKind::SequentialReindex)
        .unwrap();
    assert_eq!(report.status, ReportStatus::Completed);
    assert_eq!(report.index_version, 2);
    assert_eq!((report.start_height, report.end_height), (1, 8));

    // a second pass finds nothing outdated
    let err = backfill(&harness, 1)
        .execute(&CancellationToken::new(), BackfillUseCaseConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IndexingError::Source(SourceError::NothingToBackfill { index_version: 2 })
    ));
}

#[tokio::test]
async fn test_session_target_refreshes_every_syncable() {
    let harness = indexed_with_version_one().await;

    let config = BackfillUseCaseConfig {
        target_ids: vec![2],
        ..BackfillUseCaseConfig::default()
    };
    backfill(&harness, 1)
        .execute(&CancellationToken::new(), config)
        .await
        .unwrap();

    // heights between session ends still refresh their syncable
    assert!(versions(&harness).iter().all(|(_, version)| *version == 2));
    assert_eq!(harness.memory.validator_session_seqs().len(), 10);
    assert_eq!(harness.memory.block_seqs().len(), 8);

    // nothing is left outdated for a full pass to pick up
    let err = backfill(&harness, 1)
        .execute(&CancellationToken::new(), BackfillUseCaseConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IndexingError::Source(SourceError::NothingToBackfill { index_version: 2 })
    ));
}

#[tokio::test]
async fn test_backfill_is_refused_while_another_one_is_open() {
    let harness = indexed_with_version_one().await;
    harness
        .stores
        .reports
        .create(&Report::running(ReportKind::ParallelReindex, 2, 1, 8))
        .await
        .unwrap();

    let err = backfill(&harness, 1)
        .execute(&CancellationToken::new(), BackfillUseCaseConfig::default())
        .await
        .unwrap_err();
    assert!(err.is_already_running());
    assert!(versions(&harness).iter().all(|(_, version)| *version == 1));
}

#[tokio::test]
async fn test_forced_backfill_clears_stale_reindex_reports() {
    let harness = indexed_with_version_one().await;
    harness
        .stores
        .reports
        .create(&Report::running(ReportKind::SequentialReindex, 2, 1, 8))
        .await
        .unwrap();

    let config = BackfillUseCaseConfig {
        force: true,
        ..BackfillUseCaseConfig::default()
    };
    backfill(&harness, 1)
        .execute(&CancellationToken::new(), config)
        .await
        .unwrap();

    let reports = harness.memory.reports();
    let kinds: Vec<_> = reports.iter().map(|r| (r.kind, r.status)).collect();
    assert_eq!(
        kinds,
        vec![
            (ReportKind::Index, ReportStatus::Completed),
            (ReportKind::SequentialReindex, ReportStatus::Completed),
        ]
    );
}

#[tokio::test]
async fn test_parallel_backfill_covers_the_whole_range() {
    let harness = indexed_with_version_one().await;
    let aggs_before = harness.memory.validator_aggs();

    let config = BackfillUseCaseConfig {
        parallel: true,
        ..BackfillUseCaseConfig::default()
    };
    let summary = backfill(&harness, 3)
        .execute(&CancellationToken::new(), config)
        .await
        .unwrap();

    assert_eq!(summary.processed, 8);
    assert_eq!(summary.last_height, Some(8));
    assert!(versions(&harness).iter().all(|(_, version)| *version == 2));

    // running aggregates are left alone out of height order
    assert_eq!(harness.memory.validator_aggs(), aggs_before);

    let report = harness
        .memory
        .reports()
        .into_iter()
        .find(|r| r.kind == ReportKind::ParallelReindex)
        .unwrap();
    assert_eq!(report.status, ReportStatus::Completed);
    assert_eq!(report.success_count, 8);
}

#[tokio::test]
async fn test_parallel_backfill_failure_is_reported() {
    let harness = indexed_with_version_one().await;
    harness.chain.fail_at(7);

    let config = BackfillUseCaseConfig {
        parallel: true,
        ..BackfillUseCaseConfig::default()
    };
    let err = backfill(&harness, 2)
        .execute(&CancellationToken::new(), config)
        .await
        .unwrap_err();
    assert!(matches!(err, IndexingError::Pipeline(_)));

    let report = harness
        .memory
        .reports()
        .into_iter()
        .find(|r| r.kind == ReportKind::ParallelReindex)
        .unwrap();
    assert_eq!(report.status, ReportStatus::Failed);
    assert!(versions(&harness).contains(&(7, 1)));
}

#[tokio::test]
async fn test_unknown_target_is_rejected() {
    let harness = indexed_with_version_one().await;
    let config = BackfillUseCaseConfig {
        target_ids: vec![99],
        ..BackfillUseCaseConfig::default()
    };
    let err = backfill(&harness, 1)
        .execute(&CancellationToken::new(), config)
        .await
        .unwrap_err();
    assert!(matches!(err, IndexingError::Config(ConfigError::UnknownTarget(99))));
}

#[tokio::test]
async fn test_sequential_backfill_keeps_validator_counters() {
    let harness = indexed_with_version_one().await;
    let aggs_before = harness.memory.validator_aggs();

    backfill(&harness, 1)
        .execute(&CancellationToken::new(), BackfillUseCaseConfig::default())
        .await
        .unwrap();

    let counters: Vec<_> = harness
        .memory
        .validator_aggs()
        .iter()
        .map(|a| (a.stash_account.clone(), a.accumulated_uptime, a.accumulated_uptime_count))
        .collect();
    assert_eq!(
        counters,
        vec![
            ("alice".to_string(), 4, 4),
            ("bob".to_string(), 4, 4),
            ("carol".to_string(), 2, 2),
        ]
    );
    assert_eq!(harness.memory.validator_aggs(), aggs_before);
}

#[tokio::test]
async fn test_backfill_proceeds_once_the_earlier_reindex_is_closed() {
    for failed in [false, true] {
        let harness = indexed_with_version_one().await;
        let mut earlier = harness
            .stores
            .reports
            .create(&Report::running(ReportKind::ParallelReindex, 2, 1, 8))
            .await
            .unwrap();
        let error = failed.then(|| "chain unavailable".to_string());
        earlier.complete(3, error);
        harness.stores.reports.save(&earlier).await.unwrap();

        let summary = backfill(&harness, 1)
            .execute(&CancellationToken::new(), BackfillUseCaseConfig::default())
            .await
            .unwrap();
        assert_eq!(summary.processed, 8);
        assert!(versions(&harness).iter().all(|(_, version)| *version == 2));
    }
}
