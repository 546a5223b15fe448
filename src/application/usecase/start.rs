use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::error::IndexingError;
use crate::application::indexer::{IndexConfig, IndexingPipeline};
use crate::application::pipeline::RunSummary;
use crate::domain::models::ReportKind;
use crate::infrastructure::persistence::stores::ReportStore;

/// Indexes new heights unless a sequential reindex is in progress
pub struct StartUseCase {
    pipeline: Arc<IndexingPipeline>,
    reports: Arc<dyn ReportStore>,
}

impl StartUseCase {
    pub fn new(pipeline: Arc<IndexingPipeline>, reports: Arc<dyn ReportStore>) -> Self {
        Self { pipeline, reports }
    }

    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        batch_size: i64,
    ) -> Result<RunSummary, IndexingError> {
        self.can_execute().await?;
        self.pipeline.start(cancel, IndexConfig { batch_size }).await
    }

    async fn can_execute(&self) -> Result<(), IndexingError> {
        match self
            .reports
            .find_not_completed_by_kinds(&[ReportKind::SequentialReindex])
            .await?
        {
            Some(_) => Err(IndexingError::RunningSequentialReindex),
            None => Ok(()),
        }
    }
}
