use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::error::IndexingError;
use crate::application::indexer::{BackfillConfig, IndexingPipeline};
use crate::application::pipeline::RunSummary;
use crate::domain::models::ReportKind;
use crate::infrastructure::persistence::stores::ReportStore;

#[derive(Debug, Clone, Default)]
pub struct BackfillUseCaseConfig {
    /// Split the range across concurrent workers
    pub parallel: bool,
    /// Run even when another reindex report is still open
    pub force: bool,
    /// Targets to recompute; empty recomputes everything
    pub target_ids: Vec<i64>,
}

/// Reindexes heights produced by an older index version
pub struct BackfillUseCase {
    pipeline: Arc<IndexingPipeline>,
    reports: Arc<dyn ReportStore>,
}

impl BackfillUseCase {
    pub fn new(pipeline: Arc<IndexingPipeline>, reports: Arc<dyn ReportStore>) -> Self {
        Self { pipeline, reports }
    }

    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        config: BackfillUseCaseConfig,
    ) -> Result<RunSummary, IndexingError> {
        if !config.force {
            self.can_execute().await?;
        }

        self.pipeline
            .backfill(
                cancel,
                BackfillConfig {
                    parallel: config.parallel,
                    force: config.force,
                    target_ids: config.target_ids,
                },
            )
            .await
    }

    /// Advisory check; two processes racing here may both pass
    async fn can_execute(&self) -> Result<(), IndexingError> {
        let running = self
            .reports
            .find_not_completed_by_kinds(&[
                ReportKind::SequentialReindex,
                ReportKind::ParallelReindex,
            ])
            .await?;
        match running {
            Some(_) => Err(IndexingError::BackfillRunning),
            None => Ok(()),
        }
    }
}
