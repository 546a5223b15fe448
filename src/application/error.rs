use thiserror::Error;

use crate::application::pipeline::PipelineError;
use crate::config::ConfigError;
use crate::application::pipeline::SourceError;
use crate::infrastructure::chain::ChainClientError;
use crate::infrastructure::persistence::error::DbError;

/// Error returned by the indexing use cases
#[derive(Debug, Error)]
pub enum IndexingError {
    #[error("backfill already running (use force flag to override it)")]
    BackfillRunning,
    #[error("indexing skipped because sequential reindex hasn't finished yet")]
    RunningSequentialReindex,
    #[error("invalid purge interval '{value}': {reason}")]
    InvalidPurgeInterval { value: String, reason: String },
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Database error: {0}")]
    Db(#[from] DbError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Chain client error: {0}")]
    Chain(#[from] ChainClientError),
    #[error("backfill worker panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IndexingError {
    /// Single-flight refusals; the caller may retry later
    pub fn is_already_running(&self) -> bool {
        matches!(
            self,
            IndexingError::BackfillRunning | IndexingError::RunningSequentialReindex
        )
    }
}
