// ABOUTME: YAML manifest loading for task and workflow definitions
// ABOUTME: Declared tasks run shell commands; maps preserve declaration order

pub mod error;

pub use error::{ManifestError, Result};

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::engine::{FailurePolicy, Task, TaskType, Workflow, WorkflowEngine};

/// A declarative set of tasks and workflows loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub tasks: IndexMap<String, TaskSpec>,
    #[serde(default)]
    pub workflows: IndexMap<String, WorkflowSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub name: Option<String>,
    #[serde(rename = "type", default = "default_task_type")]
    pub task_type: TaskType,
    /// Program the task handler executes.
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub schedule: Option<String>,
    #[serde(default)]
    pub retries: u32,
    #[serde(with = "humantime_serde", default)]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSpec {
    pub name: Option<String>,
    pub tasks: Vec<String>,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

fn default_task_type() -> TaskType {
    TaskType::Agent
}

impl Manifest {
    pub fn parse(contents: &str) -> Result<Self> {
        let manifest: Manifest = serde_yaml::from_str(contents)?;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Cross-check the manifest: workflows may only reference declared tasks,
    /// every workflow has at least one task, and commands are non-empty.
    pub fn validate(&self) -> Result<()> {
        for (task_id, spec) in &self.tasks {
            if spec.command.trim().is_empty() {
                return Err(ManifestError::InvalidTask {
                    task_id: task_id.clone(),
                    reason: "command is empty".to_string(),
                });
            }
        }

        for (workflow_id, spec) in &self.workflows {
            if spec.tasks.is_empty() {
                return Err(ManifestError::EmptyWorkflow {
                    workflow_id: workflow_id.clone(),
                });
            }
            for task_id in &spec.tasks {
                if !self.tasks.contains_key(task_id) {
                    return Err(ManifestError::UnknownTask {
                        workflow_id: workflow_id.clone(),
                        task_id: task_id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Validate and register every declared task and workflow into an engine.
    pub async fn register_into(&self, engine: &WorkflowEngine) -> Result<()> {
        self.validate()?;

        for (task_id, spec) in &self.tasks {
            debug!(task_id = %task_id, command = %spec.command, "Registering manifest task");
            engine
                .executor()
                .registry()
                .register(spec.to_task(task_id))
                .await;
        }

        for (workflow_id, spec) in &self.workflows {
            engine.register_workflow(spec.to_workflow(workflow_id)).await;
        }

        Ok(())
    }

    /// Task ids that carry a schedule expression, in declaration order.
    pub fn scheduled_tasks(&self) -> Vec<(String, String)> {
        self.tasks
            .iter()
            .filter_map(|(id, spec)| {
                spec.schedule
                    .as_ref()
                    .map(|expr| (id.clone(), expr.clone()))
            })
            .collect()
    }
}

impl TaskSpec {
    /// Build an engine task whose handler runs the declared command and fails
    /// on a non-zero exit status.
    pub fn to_task(&self, id: &str) -> Task {
        let program = self.command.clone();
        let args = self.args.clone();

        let handler = move || {
            let program = program.clone();
            let args = args.clone();
            async move {
                let output = tokio::process::Command::new(&program)
                    .args(&args)
                    .output()
                    .await
                    .with_context(|| format!("failed to spawn '{}'", program))?;

                if output.status.success() {
                    Ok(())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(anyhow::anyhow!(
                        "'{}' exited with {}: {}",
                        program,
                        output.status,
                        stderr.trim()
                    ))
                }
            }
        };

        let mut task = Task::from_fn(
            id,
            self.name.clone().unwrap_or_else(|| id.to_string()),
            self.task_type,
            handler,
        )
        .with_retries(self.retries);

        if let Some(expression) = &self.schedule {
            task = task.with_schedule(expression.clone());
        }
        if let Some(timeout) = self.timeout {
            task = task.with_timeout_ms(timeout.as_millis() as u64);
        }
        for (key, value) in &self.metadata {
            task = task.with_metadata(key.clone(), value.clone());
        }

        task
    }
}

impl WorkflowSpec {
    pub fn to_workflow(&self, id: &str) -> Workflow {
        let mut workflow = Workflow::new(
            id,
            self.name.clone().unwrap_or_else(|| id.to_string()),
            self.tasks.clone(),
        )
        .with_failure_policy(self.on_failure);

        if self.parallel {
            workflow = workflow.parallel();
        }
        workflow
    }
}
