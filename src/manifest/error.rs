// ABOUTME: Error types for manifest loading and validation
// ABOUTME: Covers IO, YAML parsing, and cross-reference failures

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid manifest YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Workflow '{workflow_id}' references unknown task '{task_id}'")]
    UnknownTask {
        workflow_id: String,
        task_id: String,
    },

    #[error("Invalid task '{task_id}': {reason}")]
    InvalidTask { task_id: String, reason: String },

    #[error("Workflow '{workflow_id}' declares no tasks")]
    EmptyWorkflow { workflow_id: String },
}

pub type Result<T> = std::result::Result<T, ManifestError>;
