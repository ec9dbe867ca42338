// ABOUTME: Recurring task scheduling on fixed intervals derived from schedule expressions
// ABOUTME: Interval resolution is a finite lookup table with a one-hour fallback, not a cron parser

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::error::Result;
use super::executor::TaskExecutor;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3600);

/// Resolve a schedule expression to a period through a fixed lookup table.
/// Unrecognized expressions fall back to [`DEFAULT_INTERVAL`]. A cron-grammar
/// evaluator could replace this function without touching anything else.
pub fn resolve_interval(expression: &str) -> Duration {
    let seconds = match expression.trim().to_lowercase().as_str() {
        "every minute" => 60,
        "every 5 minutes" => 300,
        "every 15 minutes" => 900,
        "every 30 minutes" => 1800,
        "every hour" | "hourly" => 3600,
        "every 6 hours" => 21_600,
        "every 12 hours" => 43_200,
        "daily" | "every day" => 86_400,
        "weekly" | "every week" => 604_800,
        other => {
            warn!(
                expression = other,
                "Unrecognized schedule expression, falling back to one hour"
            );
            return DEFAULT_INTERVAL;
        }
    };
    Duration::from_secs(seconds)
}

/// Triggers a task's execution on a fixed interval. One timer per task id;
/// re-scheduling replaces the prior timer, and a failed run never cancels
/// future ticks.
pub struct RecurringScheduler {
    executor: Arc<TaskExecutor>,
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl RecurringScheduler {
    pub fn new(executor: Arc<TaskExecutor>) -> Self {
        Self {
            executor,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Begin periodic execution of a registered task. The first run fires one
    /// full period after scheduling.
    pub async fn schedule(&self, task_id: &str, expression: &str) -> Result<()> {
        // Unknown ids are a programmer error, surfaced here rather than on
        // every tick.
        self.executor.registry().get(task_id).await?;

        let period = resolve_interval(expression);
        info!(
            task_id,
            expression,
            period_ms = period.as_millis() as u64,
            "Scheduling recurring task"
        );

        let executor = Arc::clone(&self.executor);
        let id = task_id.to_string();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // An interval's first tick completes immediately; consume it so
            // runs start one period from now.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let executor = Arc::clone(&executor);
                let task_id = id.clone();
                // Each run is its own task, so unscheduling (which aborts
                // the ticker) never tears down an in-flight execution.
                tokio::spawn(async move {
                    match executor.execute(&task_id).await {
                        Ok(result) if result.is_failed() => {
                            warn!(
                                task_id = %task_id,
                                status = %result.status,
                                error = ?result.error,
                                "Scheduled run failed; future runs unaffected"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(
                                task_id = %task_id,
                                error = %e,
                                "Scheduled run errored; future runs unaffected"
                            );
                        }
                    }
                });
            }
        });

        let mut timers = self.timers.lock().expect("timer map poisoned");
        if let Some(previous) = timers.remove(task_id) {
            debug!(task_id, "Replacing existing recurring timer");
            previous.abort();
        }
        timers.insert(task_id.to_string(), handle);
        Ok(())
    }

    /// Cancel future ticks for a task. Returns false when nothing was
    /// scheduled under that id. An in-flight execution runs to completion.
    pub fn unschedule(&self, task_id: &str) -> bool {
        let mut timers = self.timers.lock().expect("timer map poisoned");
        match timers.remove(task_id) {
            Some(handle) => {
                handle.abort();
                info!(task_id, "Unscheduled recurring task");
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self, task_id: &str) -> bool {
        self.timers
            .lock()
            .expect("timer map poisoned")
            .contains_key(task_id)
    }

    pub fn scheduled_ids(&self) -> Vec<String> {
        self.timers
            .lock()
            .expect("timer map poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Cancel every timer; used on shutdown.
    pub fn clear(&self) {
        let mut timers = self.timers.lock().expect("timer map poisoned");
        for (task_id, handle) in timers.drain() {
            debug!(task_id = %task_id, "Cancelling recurring timer");
            handle.abort();
        }
    }
}

impl Drop for RecurringScheduler {
    fn drop(&mut self) {
        self.clear();
    }
}
