// ABOUTME: Workflow model and the engine that composes tasks into one logical unit
// ABOUTME: Handles sequential/parallel execution and the workflow failure policy

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::{EngineError, Result};
use super::executor::TaskExecutor;
use super::result::{EngineStats, TaskResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    Stop,
    Continue,
    /// Declared intent surfaced to export formats; inside the engine it
    /// behaves like `Continue` (tasks already carry their own retry policy).
    Retry,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Stop => "stop",
            FailurePolicy::Continue => "continue",
            FailurePolicy::Retry => "retry",
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered composition of registered tasks executed under one failure policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    /// Task ids in declared order; results are always returned in this order.
    pub tasks: Vec<String>,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

impl Workflow {
    pub fn new(id: impl Into<String>, name: impl Into<String>, tasks: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tasks,
            parallel: false,
            on_failure: FailurePolicy::Stop,
        }
    }

    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }
}

/// Composes registered tasks into workflows and drives their execution
/// through the task executor. Workflows themselves never retry tasks beyond
/// what each task's own retry setting provides.
pub struct WorkflowEngine {
    executor: Arc<TaskExecutor>,
    workflows: RwLock<HashMap<String, Arc<Workflow>>>,
}

impl WorkflowEngine {
    pub fn new(executor: Arc<TaskExecutor>) -> Self {
        Self {
            executor,
            workflows: RwLock::new(HashMap::new()),
        }
    }

    pub fn executor(&self) -> &Arc<TaskExecutor> {
        &self.executor
    }

    /// Register or replace a workflow definition (last write wins).
    pub async fn register_workflow(&self, workflow: Workflow) {
        info!(
            workflow_id = %workflow.id,
            workflow_name = %workflow.name,
            tasks = workflow.tasks.len(),
            parallel = workflow.parallel,
            "Workflow registered"
        );
        self.workflows
            .write()
            .await
            .insert(workflow.id.clone(), Arc::new(workflow));
    }

    pub async fn get_workflow(&self, workflow_id: &str) -> Result<Arc<Workflow>> {
        self.workflows
            .read()
            .await
            .get(workflow_id)
            .cloned()
            .ok_or_else(|| EngineError::WorkflowNotFound {
                workflow_id: workflow_id.to_string(),
            })
    }

    pub async fn workflow_count(&self) -> usize {
        self.workflows.read().await.len()
    }

    pub async fn workflow_ids(&self) -> Vec<String> {
        self.workflows.read().await.keys().cloned().collect()
    }

    /// Execute a workflow, returning one result per executed task in declared
    /// order. Under `on_failure: stop` a sequential workflow halts at the
    /// first failed task and the remaining tasks are never attempted, so the
    /// returned list may be shorter than the declaration.
    pub async fn execute_workflow(&self, workflow_id: &str) -> Result<Vec<TaskResult>> {
        let workflow = self.get_workflow(workflow_id).await?;
        let run_id = Uuid::new_v4();

        info!(
            workflow_id = %workflow.id,
            %run_id,
            parallel = workflow.parallel,
            "Starting workflow execution with {} task(s)",
            workflow.tasks.len()
        );

        let results = if workflow.parallel {
            self.execute_parallel(&workflow).await?
        } else {
            self.execute_sequential(&workflow).await?
        };

        info!(
            workflow_id = %workflow.id,
            %run_id,
            completed = results.len(),
            "Workflow execution finished"
        );

        Ok(results)
    }

    /// Fan out every task concurrently and collect results once all settle.
    /// `join_all` preserves input order, so the output list matches the
    /// declaration order regardless of completion timing.
    async fn execute_parallel(&self, workflow: &Workflow) -> Result<Vec<TaskResult>> {
        let futures = workflow
            .tasks
            .iter()
            .map(|task_id| self.executor.execute(task_id));

        join_all(futures).await.into_iter().collect()
    }

    async fn execute_sequential(&self, workflow: &Workflow) -> Result<Vec<TaskResult>> {
        let mut results = Vec::with_capacity(workflow.tasks.len());

        for task_id in &workflow.tasks {
            let result = self.executor.execute(task_id).await?;
            let halt = result.status == super::result::TaskStatus::Failed
                && workflow.on_failure == FailurePolicy::Stop;
            results.push(result);

            if halt {
                warn!(
                    workflow_id = %workflow.id,
                    task_id = %task_id,
                    "Task failed with on_failure=stop, halting workflow"
                );
                break;
            }
        }

        Ok(results)
    }

    /// Engine-wide statistics snapshot, derived on demand.
    pub async fn stats(&self) -> EngineStats {
        let history = self.executor.history_stats().await;
        EngineStats {
            total_tasks: self.executor.registry().len().await,
            total_workflows: self.workflow_count().await,
            total_executions: history.total_executions,
            success_rate: history.success_rate,
            avg_duration_ms: history.avg_duration_ms,
        }
    }
}
