// ABOUTME: Pluggable exporters projecting workflows into external scheduling formats
// ABOUTME: Exporters consume only the workflow/task shape and never touch execution

use std::sync::Arc;
use thiserror::Error;

use crate::engine::{FailurePolicy, Task, Workflow};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unknown export format: {format}")]
    UnknownFormat { format: String },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Projects a workflow and its constituent tasks into an external format.
pub trait WorkflowExporter: Send + Sync {
    fn format(&self) -> &'static str;
    fn export(&self, workflow: &Workflow, tasks: &[Arc<Task>]) -> Result<String>;
}

/// Look up a shipped exporter by format name.
pub fn exporter_for(format: &str) -> Result<Box<dyn WorkflowExporter>> {
    match format {
        "cron" => Ok(Box::new(CronManifestExporter)),
        "statemachine" => Ok(Box::new(StateMachineExporter)),
        other => Err(ExportError::UnknownFormat {
            format: other.to_string(),
        }),
    }
}

/// Renders a crontab-style manifest with one line per task, mapping each
/// task's schedule expression onto cron fields. Tasks without a schedule get
/// the hourly fallback, matching the recurring scheduler's default.
pub struct CronManifestExporter;

fn cron_fields(expression: Option<&str>) -> &'static str {
    match expression.map(|e| e.trim().to_lowercase()).as_deref() {
        Some("every minute") => "* * * * *",
        Some("every 5 minutes") => "*/5 * * * *",
        Some("every 15 minutes") => "*/15 * * * *",
        Some("every 30 minutes") => "*/30 * * * *",
        Some("every 6 hours") => "0 */6 * * *",
        Some("every 12 hours") => "0 */12 * * *",
        Some("daily") | Some("every day") => "0 0 * * *",
        Some("weekly") | Some("every week") => "0 0 * * 0",
        _ => "0 * * * *",
    }
}

impl WorkflowExporter for CronManifestExporter {
    fn format(&self) -> &'static str {
        "cron"
    }

    fn export(&self, workflow: &Workflow, tasks: &[Arc<Task>]) -> Result<String> {
        let mut lines = vec![format!("# workflow: {} ({})", workflow.name, workflow.id)];
        for task in tasks {
            lines.push(format!(
                "{} conductor run --task {}",
                cron_fields(task.schedule.as_deref()),
                task.id
            ));
        }
        lines.push(String::new());
        Ok(lines.join("\n"))
    }
}

/// Renders a managed-workflow description: a JSON state machine with one
/// state per task in declared order, carrying each task's retry and timeout
/// policy and the workflow failure policy.
pub struct StateMachineExporter;

impl WorkflowExporter for StateMachineExporter {
    fn format(&self) -> &'static str {
        "statemachine"
    }

    fn export(&self, workflow: &Workflow, tasks: &[Arc<Task>]) -> Result<String> {
        let mut states = serde_json::Map::new();
        for (index, task) in tasks.iter().enumerate() {
            let mut state = serde_json::json!({
                "type": "task",
                "resource": format!("task:{}", task.id),
                "retry": {
                    "max_attempts": task.retries + 1,
                    "backoff_rate": 2.0,
                    "interval_ms": 1000,
                },
            });
            if let Some(timeout_ms) = task.timeout_ms {
                state["timeout_ms"] = serde_json::json!(timeout_ms);
            }
            let is_last = index + 1 == tasks.len();
            if workflow.parallel || is_last {
                state["end"] = serde_json::json!(true);
            } else {
                state["next"] = serde_json::json!(tasks[index + 1].id);
            }
            if workflow.on_failure == FailurePolicy::Retry {
                state["catch"] = serde_json::json!({ "strategy": "retry" });
            }
            states.insert(task.id.clone(), state);
        }

        let document = serde_json::json!({
            "name": workflow.name,
            "id": workflow.id,
            "execution": if workflow.parallel { "parallel" } else { "sequential" },
            "on_failure": workflow.on_failure.as_str(),
            "start_at": tasks.first().map(|t| t.id.clone()),
            "states": states,
        });

        Ok(serde_json::to_string_pretty(&document)?)
    }
}
