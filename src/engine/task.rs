// ABOUTME: Task definition, handler trait, and the in-memory task registry
// ABOUTME: Registration replaces prior definitions and emits a tracing event for observability

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Agent,
    Cron,
    Webhook,
    Scheduled,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Agent => "agent",
            TaskType::Cron => "cron",
            TaskType::Webhook => "webhook",
            TaskType::Scheduled => "scheduled",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The unit of work the engine runs. The engine only observes completion or
/// failure; what the handler does internally is opaque to it.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn run(&self) -> anyhow::Result<()>;
}

/// Adapter so plain async closures can be registered as handlers.
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> TaskHandler for FnHandler<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn run(&self) -> anyhow::Result<()> {
        (self.0)().await
    }
}

#[derive(Clone, Serialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub schedule: Option<String>,
    #[serde(skip)]
    pub handler: Arc<dyn TaskHandler>,
    pub retries: u32,
    pub timeout_ms: Option<u64>,
    pub metadata: HashMap<String, String>,
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("task_type", &self.task_type)
            .field("schedule", &self.schedule)
            .field("retries", &self.retries)
            .field("timeout_ms", &self.timeout_ms)
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        task_type: TaskType,
        handler: Arc<dyn TaskHandler>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            task_type,
            schedule: None,
            handler,
            retries: 0,
            timeout_ms: None,
            metadata: HashMap::new(),
        }
    }

    /// Build a task from an async closure.
    pub fn from_fn<F, Fut>(
        id: impl Into<String>,
        name: impl Into<String>,
        task_type: TaskType,
        f: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::new(id, name, task_type, Arc::new(FnHandler(f)))
    }

    pub fn with_schedule(mut self, expression: impl Into<String>) -> Self {
        self.schedule = Some(expression.into());
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// In-memory mapping from task id to definition. Re-registering an id
/// silently replaces the prior definition (last write wins).
pub struct TaskRegistry {
    tasks: RwLock<HashMap<String, Arc<Task>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self, task: Task) {
        info!(
            task_id = %task.id,
            task_name = %task.name,
            task_type = %task.task_type,
            "Task registered"
        );
        self.tasks.write().await.insert(task.id.clone(), Arc::new(task));
    }

    pub async fn get(&self, task_id: &str) -> Result<Arc<Task>> {
        self.tasks
            .read()
            .await
            .get(task_id)
            .cloned()
            .ok_or_else(|| EngineError::TaskNotFound {
                task_id: task_id.to_string(),
            })
    }

    pub async fn contains(&self, task_id: &str) -> bool {
        self.tasks.read().await.contains_key(task_id)
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    pub async fn task_ids(&self) -> Vec<String> {
        self.tasks.read().await.keys().cloned().collect()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
