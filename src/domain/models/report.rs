use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of orchestration run tracked by a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Index,
    SequentialReindex,
    ParallelReindex,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Index => "index",
            ReportKind::SequentialReindex => "sequential_reindex",
            ReportKind::ParallelReindex => "parallel_reindex",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "index" => Ok(ReportKind::Index),
            "sequential_reindex" => Ok(ReportKind::SequentialReindex),
            "parallel_reindex" => Ok(ReportKind::ParallelReindex),
            other => Err(format!("unknown report kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Running,
    Completed,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Running => "running",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(ReportStatus::Running),
            "completed" => Ok(ReportStatus::Completed),
            "failed" => Ok(ReportStatus::Failed),
            other => Err(format!("unknown report status: {}", other)),
        }
    }
}

/// Persisted record of one orchestration run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Zero until the report has been stored
    pub id: i64,
    pub kind: ReportKind,
    pub status: ReportStatus,
    pub index_version: i64,
    pub start_height: i64,
    pub end_height: i64,
    pub success_count: i64,
    pub error_count: i64,
    pub error_msg: Option<String>,
    /// Run duration in milliseconds
    pub duration: i64,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn running(kind: ReportKind, index_version: i64, start_height: i64, end_height: i64) -> Self {
        Self {
            id: 0,
            kind,
            status: ReportStatus::Running,
            index_version,
            start_height,
            end_height,
            success_count: 0,
            error_count: 0,
            error_msg: None,
            duration: 0,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Closes the report with the outcome of the run
    pub fn complete(&mut self, success_count: i64, error: Option<String>) {
        let now = Utc::now();
        self.success_count = success_count;
        self.error_count = i64::from(error.is_some());
        self.status = if error.is_some() {
            ReportStatus::Failed
        } else {
            ReportStatus::Completed
        };
        self.error_msg = error;
        self.duration = (now - self.created_at).num_milliseconds();
        self.completed_at = Some(now);
    }

    pub fn is_running(&self) -> bool {
        self.status == ReportStatus::Running
    }
}
