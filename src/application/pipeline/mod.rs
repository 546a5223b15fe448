//! Height-by-height execution of staged tasks.
//!
//! For every height a source yields, the engine builds a fresh payload and
//! runs each stage's tasks in registration order. The first failing task stops
//! the run.

pub mod error;
pub mod metrics;
pub mod source;
pub mod stage;
pub mod task;

use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub use error::{PipelineError, SourceError, TaskError};
pub use metrics::{LogTaskMetrics, TaskMetrics, TaskTimer};
pub use source::{HeightCursor, Source};
pub use stage::StageName;
pub use task::{HeightPayload, Task};

use crate::utils::logging;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// When set, only tasks named here run
    pub task_whitelist: Option<HashSet<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Heights that went through every stage
    pub processed: i64,
    pub last_height: Option<i64>,
    /// The run stopped on cancellation rather than source exhaustion
    pub cancelled: bool,
}

pub struct Pipeline<P: Send> {
    stages: [Vec<Arc<dyn Task<P>>>; 6],
    metrics: Arc<dyn TaskMetrics>,
}

impl<P: HeightPayload> Default for Pipeline<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: HeightPayload> Pipeline<P> {
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(LogTaskMetrics))
    }

    pub fn with_metrics(metrics: Arc<dyn TaskMetrics>) -> Self {
        Self {
            stages: Default::default(),
            metrics,
        }
    }

    pub fn add_task<T: Task<P> + 'static>(&mut self, stage: StageName, task: T) -> &mut Self {
        self.stages[stage.index()].push(Arc::new(task));
        self
    }

    /// Task names per stage, in execution order
    pub fn task_names(&self) -> Vec<(StageName, &'static str)> {
        StageName::ORDERED
            .iter()
            .flat_map(|stage| {
                self.stages[stage.index()]
                    .iter()
                    .map(move |task| (*stage, task.name()))
            })
            .collect()
    }

    /// Drives `source` to exhaustion or cancellation
    pub async fn run<S: Source + ?Sized>(
        &self,
        source: &mut S,
        options: &RunOptions,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, PipelineError> {
        let mut processed = 0;
        let mut last_completed_height = None;
        let mut cancelled = false;

        loop {
            if cancel.is_cancelled() {
                logging::log_info(&format!(
                    "Pipeline cancelled after {} heights [last_height={:?}]",
                    processed, last_completed_height
                ));
                cancelled = true;
                break;
            }
            if !source.next() {
                break;
            }

            let height = source.current();
            let mut payload = P::for_height(height);

            for stage in StageName::ORDERED {
                for task in &self.stages[stage.index()] {
                    if source.skip_task(stage, task.name()) {
                        continue;
                    }
                    if let Some(whitelist) = &options.task_whitelist {
                        if !whitelist.contains(task.name()) {
                            continue;
                        }
                    }

                    let _timer = TaskTimer::start(self.metrics.as_ref(), stage, task.name());
                    if let Err(err) = task.run(&mut payload).await {
                        logging::log_error(&format!(
                            "Task failed [stage={}] [task={}] [height={}]: {}",
                            stage,
                            task.name(),
                            height,
                            err
                        ));
                        return Err(PipelineError::Task {
                            height,
                            stage,
                            task: task.name(),
                            last_completed_height,
                            source: err,
                        });
                    }
                }
            }

            processed += 1;
            last_completed_height = Some(height);
        }

        if let Some(err) = source.err() {
            return Err(PipelineError::Source {
                last_completed_height,
                message: err.to_string(),
            });
        }

        Ok(RunSummary {
            processed,
            last_height: last_completed_height,
            cancelled,
        })
    }
}
