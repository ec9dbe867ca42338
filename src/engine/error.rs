// ABOUTME: Error types for task execution engine operations
// ABOUTME: Defines specific error types for task, workflow, and scheduler failures

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: String },

    #[error("Workflow not found: {workflow_id}")]
    WorkflowNotFound { workflow_id: String },

    #[error("Task '{task_id}' timed out after {timeout_ms}ms")]
    TaskTimeout { task_id: String, timeout_ms: u64 },
}

pub type Result<T> = std::result::Result<T, EngineError>;
