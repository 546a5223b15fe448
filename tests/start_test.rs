mod common;

use num_bigint::BigUint;
use tokio_util::sync::CancellationToken;

use common::{Harness, ScriptedChain};
use polkadothub_indexer::application::error::IndexingError;
use polkadothub_indexer::application::pipeline::PipelineError;
use polkadothub_indexer::application::usecase::StartUseCase;
use polkadothub_indexer::domain::models::{Report, ReportKind, ReportStatus, RewardKind, SystemEventKind};

fn start(harness: &Harness) -> StartUseCase {
    StartUseCase::new(harness.pipeline(1, 1), harness.stores.reports.clone())
}

#[tokio::test]
async fn test_start_indexes_every_height_up_to_head() {
    let harness = Harness::new(ScriptedChain::new(8));
    let summary = start(&harness)
        .execute(&CancellationToken::new(), 0)
        .await
        .unwrap();

    assert_eq!(summary.processed, 8);
    assert_eq!(summary.last_height, Some(8));
    assert!(!summary.cancelled);

    let memory = &harness.memory;
    let syncables = memory.syncables();
    assert_eq!(syncables.len(), 8);
    assert!(syncables.iter().all(|s| s.index_version == 1));

    let blocks = memory.block_seqs();
    assert_eq!(blocks.len(), 8);
    assert_eq!(blocks[5].sequence.height, 6);
    assert_eq!(blocks[5].extrinsics_count, 3);
    assert_eq!(blocks[5].signed_extrinsics_count, 2);

    // two sessions with two validators, two with three
    assert_eq!(memory.validator_session_seqs().len(), 10);
    assert_eq!(memory.validator_era_seqs().len(), 4);
    assert_eq!(memory.account_era_seqs().len(), 4);
    assert_eq!(memory.event_seqs().len(), 8);
    assert_eq!(memory.transaction_seqs().len(), 9);
    assert_eq!(memory.validator_seqs().len(), 20);

    let reports = memory.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, ReportKind::Index);
    assert_eq!(reports[0].status, ReportStatus::Completed);
    assert_eq!(reports[0].success_count, 8);
    assert_eq!((reports[0].start_height, reports[0].end_height), (1, 8));
}

#[tokio::test]
async fn test_carol_joining_the_set_is_recorded_once() {
    let harness = Harness::new(ScriptedChain::new(8));
    start(&harness).execute(&CancellationToken::new(), 0).await.unwrap();

    let events = harness.memory.system_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].actor, "carol");
    assert_eq!(events[0].kind, SystemEventKind::JoinedSet);
    assert_eq!(events[0].sequence.height, 6);
    assert_eq!(events[0].data["session"], 2);
}

#[tokio::test]
async fn test_aggregates_count_session_ends() {
    let harness = Harness::new(ScriptedChain::new(8));
    start(&harness).execute(&CancellationToken::new(), 0).await.unwrap();

    let aggs = harness.memory.validator_aggs();
    assert_eq!(aggs.len(), 3);

    let alice = aggs.iter().find(|a| a.stash_account == "alice").unwrap();
    assert_eq!(alice.display_name, "ALICE");
    assert_eq!(alice.aggregate.started_at_height, 1);
    assert_eq!(alice.aggregate.recent_at_height, 8);
    assert_eq!((alice.accumulated_uptime, alice.accumulated_uptime_count), (4, 4));

    let carol = aggs.iter().find(|a| a.stash_account == "carol").unwrap();
    assert_eq!(carol.aggregate.started_at_height, 5);
    assert_eq!((carol.accumulated_uptime, carol.accumulated_uptime_count), (2, 2));
}

#[tokio::test]
async fn test_era_payout_is_fully_distributed_and_claims_are_marked() {
    let harness = Harness::new(ScriptedChain::new(8));
    start(&harness).execute(&CancellationToken::new(), 0).await.unwrap();

    let rewards = harness.memory.rewards();
    let era_zero: Vec<_> = rewards.iter().filter(|r| r.era == 0).collect();
    assert_eq!(era_zero.len(), 5);

    let total: BigUint = era_zero.iter().map(|r| r.amount.as_biguint().clone()).sum();
    assert_eq!(total, BigUint::from(1_000_000_000_000u64));

    let commission = era_zero
        .iter()
        .find(|r| r.kind == RewardKind::Commission)
        .unwrap();
    assert_eq!(commission.stash_account, "alice");
    assert_eq!(commission.amount.to_string(), "25000000000");

    // only alice paid out era 0, at height 6
    for reward in &era_zero {
        assert_eq!(reward.claimed, reward.validator_stash_account == "alice");
    }
    assert!(rewards.iter().filter(|r| r.era == 1).all(|r| !r.claimed));
}

#[tokio::test]
async fn test_start_resumes_after_the_last_syncable_and_respects_batch_size() {
    let harness = Harness::new(ScriptedChain::new(10));
    let usecase = start(&harness);
    let cancel = CancellationToken::new();

    let first = usecase.execute(&cancel, 4).await.unwrap();
    assert_eq!(first.last_height, Some(4));

    let second = usecase.execute(&cancel, 0).await.unwrap();
    assert_eq!(second.processed, 6);
    assert_eq!(second.last_height, Some(10));

    // head reached: nothing processed, no report
    let third = usecase.execute(&cancel, 0).await.unwrap();
    assert_eq!(third.processed, 0);
    assert_eq!(harness.memory.reports().len(), 2);

    harness.chain.set_head(11);
    let fourth = usecase.execute(&cancel, 0).await.unwrap();
    assert_eq!(fourth.last_height, Some(11));
}

#[tokio::test]
async fn test_start_fails_fast_and_records_the_failure() {
    let harness = Harness::new(ScriptedChain::new(8));
    harness.chain.fail_at(5);

    let err = start(&harness)
        .execute(&CancellationToken::new(), 0)
        .await
        .unwrap_err();
    match err {
        IndexingError::Pipeline(PipelineError::Task {
            height,
            task,
            last_completed_height,
            ..
        }) => {
            assert_eq!(height, 5);
            assert_eq!(task, "Fetcher");
            assert_eq!(last_completed_height, Some(4));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(harness.memory.syncables().len(), 4);
    let report = &harness.memory.reports()[0];
    assert_eq!(report.status, ReportStatus::Failed);
    assert_eq!(report.success_count, 4);
    assert!(report.error_msg.is_some());

    // the next run picks up at the failed height
    harness.chain.fail_at(0);
    let summary = start(&harness).execute(&CancellationToken::new(), 0).await.unwrap();
    assert_eq!(summary.processed, 4);
}

#[tokio::test]
async fn test_start_is_refused_while_a_sequential_reindex_runs() {
    let harness = Harness::new(ScriptedChain::new(8));
    harness
        .stores
        .reports
        .create(&Report::running(ReportKind::SequentialReindex, 1, 1, 8))
        .await
        .unwrap();

    let err = start(&harness)
        .execute(&CancellationToken::new(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, IndexingError::RunningSequentialReindex));
    assert!(harness.memory.syncables().is_empty());
}

#[tokio::test]
async fn test_start_proceeds_once_the_sequential_reindex_is_closed() {
    let harness = Harness::new(ScriptedChain::new(8));
    let mut reindex = harness
        .stores
        .reports
        .create(&Report::running(ReportKind::SequentialReindex, 1, 1, 8))
        .await
        .unwrap();
    reindex.complete(8, None);
    harness.stores.reports.save(&reindex).await.unwrap();

    let summary = start(&harness)
        .execute(&CancellationToken::new(), 0)
        .await
        .unwrap();
    assert_eq!(summary.processed, 8);
    assert_eq!(harness.memory.syncables().len(), 8);
}

#[tokio::test]
async fn test_cancelled_start_processes_nothing() {
    let harness = Harness::new(ScriptedChain::new(8));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = start(&harness).execute(&cancel, 0).await.unwrap();
    assert_eq!(summary.processed, 0);
    assert!(summary.cancelled);
    assert!(harness.memory.syncables().is_empty());
}
