// ABOUTME: Main library module for the conductor task execution engine
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod engine;
pub mod export;
pub mod manifest;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use engine::{
    EngineError, EngineStats, ExecutionHistory, FailurePolicy, RecurringScheduler, Task,
    TaskExecutor, TaskHandler, TaskRegistry, TaskResult, TaskStatus, TaskType, Workflow,
    WorkflowEngine,
};
pub use export::WorkflowExporter;
pub use manifest::Manifest;

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
