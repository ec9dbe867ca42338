// ABOUTME: Single-task execution with timeout racing and retry/backoff policy
// ABOUTME: Every terminal result is appended to the bounded execution history

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use chrono::Utc;

use super::error::{EngineError, Result};
use super::history::ExecutionHistory;
use super::result::{HistoryStats, TaskResult, TaskStatus};
use super::task::{Task, TaskRegistry};

/// Delay inserted before retry attempt `attempt + 1` (0-indexed attempts),
/// so the sequence runs 1s, 2s, 4s, doubling each time.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000u64.saturating_mul(2u64.saturating_pow(attempt)))
}

/// Classify a failure message. A result is only ever `Timeout` when the
/// error text indicates a timeout condition.
fn classify_failure(message: &str) -> TaskStatus {
    let lower = message.to_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        TaskStatus::Timeout
    } else {
        TaskStatus::Failed
    }
}

pub struct TaskExecutor {
    registry: Arc<TaskRegistry>,
    history: Mutex<ExecutionHistory>,
}

impl TaskExecutor {
    pub fn new(registry: Arc<TaskRegistry>) -> Self {
        Self {
            registry,
            history: Mutex::new(ExecutionHistory::new()),
        }
    }

    pub fn with_history_capacity(registry: Arc<TaskRegistry>, capacity: usize) -> Self {
        Self {
            registry,
            history: Mutex::new(ExecutionHistory::with_capacity(capacity)),
        }
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// Execute a registered task, applying its timeout and retry policy.
    ///
    /// An unknown task id fails fast and is never retried. Handler failures
    /// are retried up to `task.retries` times with exponential backoff; each
    /// attempt produces a fresh result record with fresh timestamps, and only
    /// the final attempt's record is appended to history and returned.
    pub async fn execute(&self, task_id: &str) -> Result<TaskResult> {
        let task = self.registry.get(task_id).await?;

        let mut attempt: u32 = 0;
        loop {
            let started_at = Utc::now();
            debug!(
                task_id = %task.id,
                attempt = attempt + 1,
                max_attempts = task.retries + 1,
                "Executing task"
            );

            match self.run_attempt(&task).await {
                Ok(()) => {
                    let result =
                        TaskResult::new(&task.id, TaskStatus::Success, started_at, None, attempt);
                    info!(
                        task_id = %task.id,
                        duration_ms = result.duration_ms,
                        "Task completed successfully"
                    );
                    self.append(result.clone()).await;
                    return Ok(result);
                }
                Err(message) => {
                    if attempt < task.retries {
                        // Transient record for observability only; it is
                        // never appended to history.
                        let retry_record = TaskResult::new(
                            &task.id,
                            TaskStatus::Retry,
                            started_at,
                            Some(message.clone()),
                            attempt + 1,
                        );
                        warn!(
                            task_id = %task.id,
                            error = %message,
                            retry_count = retry_record.retry_count,
                            "Task failed, retrying"
                        );

                        let delay = backoff_delay(attempt);
                        debug!(task_id = %task.id, "Waiting {:?} before retry", delay);
                        sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    let status = classify_failure(&message);
                    let result =
                        TaskResult::new(&task.id, status, started_at, Some(message), attempt);
                    error!(
                        task_id = %task.id,
                        status = %result.status,
                        error = ?result.error,
                        "Task failed after {} attempt(s)",
                        attempt + 1
                    );
                    self.append(result.clone()).await;
                    return Ok(result);
                }
            }
        }
    }

    /// Run one attempt of the handler, racing it against the task's timeout.
    ///
    /// The handler is spawned onto the runtime and the join handle is what
    /// the timeout races; on timeout the spawned handler keeps running in the
    /// background and only the reported outcome reflects the timeout. The
    /// engine assumes no cooperative cancellation from arbitrary handlers.
    async fn run_attempt(&self, task: &Task) -> std::result::Result<(), String> {
        let handler = Arc::clone(&task.handler);
        let handle = tokio::spawn(async move { handler.run().await });

        let joined = match task.timeout_ms {
            Some(timeout_ms) => {
                match timeout(Duration::from_millis(timeout_ms), handle).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        return Err(EngineError::TaskTimeout {
                            task_id: task.id.clone(),
                            timeout_ms,
                        }
                        .to_string());
                    }
                }
            }
            None => handle.await,
        };

        match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(join_error) => Err(format!("Handler panicked: {}", join_error)),
        }
    }

    async fn append(&self, result: TaskResult) {
        self.history.lock().await.append(result);
    }

    pub async fn history_stats(&self) -> HistoryStats {
        self.history.lock().await.stats()
    }

    pub async fn recent_results(&self, count: usize) -> Vec<TaskResult> {
        self.history.lock().await.recent(count)
    }

    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }
}
