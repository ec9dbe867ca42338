// ABOUTME: Task execution engine module for conductor
// ABOUTME: Handles task execution, workflow composition, history, and recurring schedules

pub mod error;
pub mod executor;
pub mod history;
pub mod recurring;
pub mod result;
pub mod task;
pub mod workflow;

pub use error::{EngineError, Result};
pub use executor::{backoff_delay, TaskExecutor};
pub use history::{ExecutionHistory, DEFAULT_HISTORY_CAPACITY};
pub use recurring::{resolve_interval, RecurringScheduler, DEFAULT_INTERVAL};
pub use result::{EngineStats, HistoryStats, TaskResult, TaskStatus};
pub use task::{FnHandler, Task, TaskHandler, TaskRegistry, TaskType};
pub use workflow::{FailurePolicy, Workflow, WorkflowEngine};
