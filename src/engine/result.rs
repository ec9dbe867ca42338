// ABOUTME: Task execution result types and derived statistics snapshots
// ABOUTME: Results are immutable once produced; statistics are computed on demand

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Success,
    Failed,
    Timeout,
    Retry,
}

impl TaskStatus {
    /// Retry is a transient state between attempts; everything else is final.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Retry)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Success => write!(f, "success"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Timeout => write!(f, "timeout"),
            TaskStatus::Retry => write!(f, "retry"),
        }
    }
}

/// Record of a single execution attempt. Each retry attempt produces a fresh
/// record; the timestamps always describe one attempt, never the whole chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    pub status: TaskStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub retry_count: u32,
}

impl TaskResult {
    pub fn new(
        task_id: impl Into<String>,
        status: TaskStatus,
        started_at: DateTime<Utc>,
        error: Option<String>,
        retry_count: u32,
    ) -> Self {
        let completed_at = Utc::now();
        let duration_ms = (completed_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            task_id: task_id.into(),
            status,
            started_at,
            completed_at,
            duration_ms,
            error,
            retry_count,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.status == TaskStatus::Success
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, TaskStatus::Failed | TaskStatus::Timeout)
    }
}

/// Aggregate view over whatever currently survives history truncation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_executions: usize,
    pub success_rate: f64,
    pub avg_duration_ms: f64,
}

impl Default for HistoryStats {
    fn default() -> Self {
        Self {
            total_executions: 0,
            success_rate: 0.0,
            avg_duration_ms: 0.0,
        }
    }
}

/// Engine-wide snapshot combining registry sizes with history statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_tasks: usize,
    pub total_workflows: usize,
    pub total_executions: usize,
    pub success_rate: f64,
    pub avg_duration_ms: f64,
}
