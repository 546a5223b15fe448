//! Wires the indexing tasks into a pipeline and drives live and backfill runs.

use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::aggregator_tasks::ValidatorAggCreatorTask;
use super::fetcher_tasks::FetcherTask;
use super::parser_tasks::{BlockParserTask, RewardClaimsParserTask, ValidatorsParserTask};
use super::payload::Payload;
use super::persistor_tasks::*;
use super::reward_tasks::RewardEraSeqCreatorTask;
use super::sequencer_tasks::*;
use super::source_backfill::BackfillSource;
use super::source_live::LiveSource;
use super::syncer_tasks::MainSyncerTask;
use super::system_event_tasks::SystemEventCreatorTask;
use crate::application::error::IndexingError;
use crate::application::pipeline::{
    Pipeline, RunOptions, RunSummary, Source, StageName, TaskMetrics,
};
use crate::config::IndexTargets;
use crate::domain::models::{Report, ReportKind};
use crate::infrastructure::chain::ChainClient;
use crate::infrastructure::persistence::Stores;
use crate::utils::logging;

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexConfig {
    /// Maximum heights per run; zero follows the head
    pub batch_size: i64,
}

#[derive(Debug, Clone, Default)]
pub struct BackfillConfig {
    pub parallel: bool,
    pub force: bool,
    pub target_ids: Vec<i64>,
}

pub struct IndexingPipeline {
    client: Arc<dyn ChainClient>,
    stores: Stores,
    targets: IndexTargets,
    metrics: Option<Arc<dyn TaskMetrics>>,
    first_block_height: i64,
    parallel_workers: usize,
}

impl IndexingPipeline {
    pub fn new(
        client: Arc<dyn ChainClient>,
        stores: Stores,
        targets: IndexTargets,
        first_block_height: i64,
        parallel_workers: usize,
    ) -> Self {
        Self {
            client,
            stores,
            targets,
            metrics: None,
            first_block_height,
            parallel_workers: parallel_workers.max(1),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn TaskMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn index_version(&self) -> i64 {
        self.targets.current_version_id()
    }

    /// Every task in execution order. Running aggregates need strict height
    /// order, so `with_aggregates` is off for parallel runs.
    pub fn build(&self, with_aggregates: bool) -> Pipeline<Payload> {
        let mut pipeline = match &self.metrics {
            Some(metrics) => Pipeline::with_metrics(metrics.clone()),
            None => Pipeline::new(),
        };
        let s = &self.stores;

        pipeline
            .add_task(
                StageName::Syncer,
                MainSyncerTask::new(self.client.clone(), self.index_version()),
            )
            .add_task(StageName::Fetcher, FetcherTask::new(self.client.clone()))
            .add_task(StageName::Parser, BlockParserTask)
            .add_task(StageName::Parser, ValidatorsParserTask)
            .add_task(StageName::Parser, RewardClaimsParserTask)
            .add_task(StageName::Sequencer, BlockSeqCreatorTask::new(s.block_seqs.clone()))
            .add_task(StageName::Sequencer, ValidatorSessionSeqCreatorTask)
            .add_task(StageName::Sequencer, ValidatorEraSeqCreatorTask)
            .add_task(StageName::Sequencer, EventSeqCreatorTask)
            .add_task(StageName::Sequencer, AccountEraSeqCreatorTask)
            .add_task(StageName::Sequencer, TransactionSeqCreatorTask)
            .add_task(StageName::Sequencer, ValidatorSeqCreatorTask)
            .add_task(StageName::Sequencer, RewardEraSeqCreatorTask)
            .add_task(
                StageName::Sequencer,
                SystemEventCreatorTask::new(s.validator_session_seqs.clone()),
            );

        if with_aggregates {
            pipeline.add_task(
                StageName::Aggregator,
                ValidatorAggCreatorTask::new(s.validator_aggs.clone()),
            );
        }

        pipeline
            .add_task(StageName::Persistor, SyncerPersistorTask::new(s.syncables.clone()))
            .add_task(StageName::Persistor, BlockSeqPersistorTask::new(s.block_seqs.clone()))
            .add_task(
                StageName::Persistor,
                ValidatorSessionSeqPersistorTask::new(s.validator_session_seqs.clone()),
            )
            .add_task(
                StageName::Persistor,
                ValidatorEraSeqPersistorTask::new(s.validator_era_seqs.clone()),
            );
        if with_aggregates {
            pipeline.add_task(
                StageName::Persistor,
                ValidatorAggPersistorTask::new(s.validator_aggs.clone()),
            );
        }
        pipeline
            .add_task(StageName::Persistor, EventSeqPersistorTask::new(s.event_seqs.clone()))
            .add_task(
                StageName::Persistor,
                AccountEraSeqPersistorTask::new(s.account_era_seqs.clone()),
            )
            .add_task(
                StageName::Persistor,
                TransactionSeqPersistorTask::new(s.transaction_seqs.clone()),
            )
            .add_task(
                StageName::Persistor,
                ValidatorSeqPersistorTask::new(s.validator_seqs.clone()),
            )
            .add_task(
                StageName::Persistor,
                SystemEventPersistorTask::new(s.system_events.clone()),
            )
            .add_task(
                StageName::Persistor,
                RewardEraSeqPersistorTask::new(s.rewards.clone()),
            );

        pipeline
    }

    /// Indexes from the most recent syncable up to the chain head
    pub async fn start(
        &self,
        cancel: &CancellationToken,
        config: IndexConfig,
    ) -> Result<RunSummary, IndexingError> {
        let mut source = LiveSource::new(
            self.stores.syncables.as_ref(),
            self.client.as_ref(),
            self.first_block_height,
            config.batch_size,
        )
        .await?;

        if source.is_empty() {
            logging::log_info("Nothing to index, chain head already reached");
            return Ok(RunSummary {
                processed: 0,
                last_height: None,
                cancelled: false,
            });
        }

        let report = Report::running(
            ReportKind::Index,
            self.index_version(),
            source.start_height(),
            source.end_height(),
        );
        let mut report = self.stores.reports.create(&report).await?;

        let result = self
            .build(true)
            .run(&mut source, &RunOptions::default(), cancel)
            .await
            .map_err(IndexingError::from);
        let processed = processed_in(&result, source.start_height());

        self.close_report(&mut report, processed, &result).await?;
        result
    }

    /// Reindexes every height produced by an older index version
    pub async fn backfill(
        &self,
        cancel: &CancellationToken,
        config: BackfillConfig,
    ) -> Result<RunSummary, IndexingError> {
        let index_version = self.index_version();
        let selection = self.targets.select(&config.target_ids)?;

        if config.force {
            let deleted = self
                .stores
                .reports
                .delete_by_kinds(&[ReportKind::SequentialReindex, ReportKind::ParallelReindex])
                .await?;
            logging::log_warning(&format!("Forced backfill removed {} reindex reports", deleted));
        }

        let source = BackfillSource::new(
            self.stores.syncables.as_ref(),
            index_version,
            selection.last_in_session,
            selection.last_in_era,
        )
        .await?;

        let options = RunOptions {
            task_whitelist: if config.target_ids.is_empty() {
                None
            } else {
                Some(selection.tasks)
            },
        };

        let kind = if config.parallel {
            ReportKind::ParallelReindex
        } else {
            ReportKind::SequentialReindex
        };
        let report = Report::running(kind, index_version, source.start_height(), source.end_height());
        let mut report = self.stores.reports.create(&report).await?;

        logging::log_info(&format!(
            "Starting {} [index_version={}] [start_height={}] [end_height={}]",
            kind,
            index_version,
            source.start_height(),
            source.end_height()
        ));

        let (processed, result) = if config.parallel {
            self.run_parallel(source, options, cancel).await
        } else {
            let mut source = source;
            let result = self
                .build(true)
                .run(&mut source, &options, cancel)
                .await
                .map_err(IndexingError::from);
            (processed_in(&result, source.start_height()), result)
        };

        self.close_report(&mut report, processed, &result).await?;
        result
    }

    /// Runs disjoint chunks of `source` concurrently and returns the number of
    /// heights completed alongside the outcome.
    ///
    /// The first failure cancels the remaining chunks between heights.
    async fn run_parallel(
        &self,
        source: BackfillSource,
        options: RunOptions,
        cancel: &CancellationToken,
    ) -> (i64, Result<RunSummary, IndexingError>) {
        let pipeline = Arc::new(self.build(false));
        let options = Arc::new(options);
        let chunk_cancel = cancel.child_token();

        let handles: Vec<_> = source
            .split(self.parallel_workers)
            .into_iter()
            .map(|mut chunk| {
                let pipeline = pipeline.clone();
                let options = options.clone();
                let chunk_cancel = chunk_cancel.clone();
                tokio::spawn(async move {
                    let result = pipeline
                        .run(&mut chunk, &options, &chunk_cancel)
                        .await
                        .map_err(IndexingError::from);
                    if result.is_err() {
                        chunk_cancel.cancel();
                    }
                    (processed_in(&result, chunk.start_height()), result)
                })
            })
            .collect();

        let mut processed = 0;
        let mut last_height: Option<i64> = None;
        let mut cancelled = false;
        let mut first_error: Option<IndexingError> = None;

        for joined in join_all(handles).await {
            match joined {
                Ok((chunk_processed, result)) => {
                    processed += chunk_processed;
                    match result {
                        Ok(chunk) => {
                            last_height = last_height.max(chunk.last_height);
                            cancelled |= chunk.cancelled;
                        }
                        Err(err) => {
                            first_error.get_or_insert(err);
                        }
                    }
                }
                Err(err) => {
                    logging::log_error(&format!("Backfill worker stopped abnormally: {}", err));
                    first_error.get_or_insert(IndexingError::Join(err));
                }
            }
        }

        let result = match first_error {
            Some(err) => Err(err),
            None => Ok(RunSummary {
                processed,
                last_height,
                cancelled,
            }),
        };
        (processed, result)
    }

    async fn close_report(
        &self,
        report: &mut Report,
        processed: i64,
        result: &Result<RunSummary, IndexingError>,
    ) -> Result<(), IndexingError> {
        match result {
            Ok(summary) => {
                report.complete(processed, None);
                logging::log_info(&format!(
                    "{} finished [processed={}] [last_height={:?}] [cancelled={}]",
                    report.kind, processed, summary.last_height, summary.cancelled
                ));
            }
            Err(err) => {
                report.complete(processed, Some(err.to_string()));
                logging::log_error(&format!("{} failed: {}", report.kind, err));
            }
        }
        self.stores.reports.save(report).await?;
        Ok(())
    }
}

/// Heights completed by a run that started at `start`
fn processed_in(result: &Result<RunSummary, IndexingError>, start: i64) -> i64 {
    match result {
        Ok(summary) => summary.processed,
        Err(IndexingError::Pipeline(err)) => err
            .last_completed_height()
            .map(|last| last - start + 1)
            .unwrap_or(0),
        Err(_) => 0,
    }
}
