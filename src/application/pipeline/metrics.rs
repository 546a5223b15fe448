use std::time::{Duration, Instant};

use crate::application::pipeline::stage::StageName;

/// Sink for per-task timings
pub trait TaskMetrics: Send + Sync {
    fn observe_task_duration(&self, stage: StageName, task: &str, elapsed: Duration);
}

/// Reports task timings at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTaskMetrics;

impl TaskMetrics for LogTaskMetrics {
    fn observe_task_duration(&self, stage: StageName, task: &str, elapsed: Duration) {
        log::debug!(
            "task finished [stage={}] [task={}] [elapsed_ms={}]",
            stage,
            task,
            elapsed.as_millis()
        );
    }
}

/// Reports the time between its creation and its drop
pub struct TaskTimer<'a> {
    metrics: &'a dyn TaskMetrics,
    stage: StageName,
    task: &'static str,
    started: Instant,
}

impl<'a> TaskTimer<'a> {
    pub fn start(metrics: &'a dyn TaskMetrics, stage: StageName, task: &'static str) -> Self {
        Self {
            metrics,
            stage,
            task,
            started: Instant::now(),
        }
    }
}

impl Drop for TaskTimer<'_> {
    fn drop(&mut self) {
        self.metrics
            .observe_task_duration(self.stage, self.task, self.started.elapsed());
    }
}
