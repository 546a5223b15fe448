use thiserror::Error;

use crate::application::pipeline::stage::StageName;
use crate::infrastructure::chain::ChainClientError;
use crate::infrastructure::persistence::error::DbError;

/// Error raised by a pipeline task while processing one height
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),
    #[error("Chain client error: {0}")]
    Chain(#[from] ChainClientError),
    #[error("payload field `{0}` was not populated by an earlier stage")]
    MissingPayload(&'static str),
    #[error("invalid chain data: {0}")]
    InvalidData(String),
}

/// Error raised while establishing the heights a source will visit
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("nothing to backfill [index_version={index_version}]")]
    NothingToBackfill { index_version: i64 },
    #[error("no whitelisted heights to backfill [index_version={index_version}]")]
    NoWhitelistHeights { index_version: i64 },
    #[error("Database error: {0}")]
    Db(#[from] DbError),
    #[error("Chain client error: {0}")]
    Chain(#[from] ChainClientError),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("task {task} failed at height {height} [stage={stage}]: {source}")]
    Task {
        height: i64,
        stage: StageName,
        task: &'static str,
        /// Highest height fully processed before the failure
        last_completed_height: Option<i64>,
        #[source]
        source: TaskError,
    },
    #[error("source stopped early: {message}")]
    Source {
        last_completed_height: Option<i64>,
        message: String,
    },
}

impl PipelineError {
    pub fn last_completed_height(&self) -> Option<i64> {
        match self {
            PipelineError::Task {
                last_completed_height,
                ..
            }
            | PipelineError::Source {
                last_completed_height,
                ..
            } => *last_completed_height,
        }
    }
}
