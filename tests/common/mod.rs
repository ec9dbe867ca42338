// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides counted task handlers and engine setup shared across suites

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use conductor::engine::{Task, TaskExecutor, TaskRegistry, TaskType, WorkflowEngine};

pub fn call_counter() -> Arc<AtomicU32> {
    Arc::new(AtomicU32::new(0))
}

pub fn test_engine() -> WorkflowEngine {
    let registry = Arc::new(TaskRegistry::new());
    WorkflowEngine::new(Arc::new(TaskExecutor::new(registry)))
}

pub fn test_engine_with_capacity(capacity: usize) -> WorkflowEngine {
    let registry = Arc::new(TaskRegistry::new());
    WorkflowEngine::new(Arc::new(TaskExecutor::with_history_capacity(
        registry, capacity,
    )))
}

/// Task whose handler succeeds immediately, counting invocations.
pub fn succeeding_task(id: &str, calls: Arc<AtomicU32>) -> Task {
    Task::from_fn(id, id, TaskType::Agent, move || {
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
}

/// Task whose handler always fails with the given message.
pub fn failing_task(id: &str, message: &str, calls: Arc<AtomicU32>) -> Task {
    let message = message.to_string();
    Task::from_fn(id, id, TaskType::Agent, move || {
        let calls = Arc::clone(&calls);
        let message = message.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!(message))
        }
    })
}

/// Task whose handler sleeps for `delay` before succeeding.
pub fn slow_task(id: &str, delay: Duration, calls: Arc<AtomicU32>) -> Task {
    Task::from_fn(id, id, TaskType::Agent, move || {
        let calls = Arc::clone(&calls);
        async move {
            tokio::time::sleep(delay).await;
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
}

/// Task whose handler sleeps for `delay`, then sets `completed` and succeeds.
/// Used to observe handlers that keep running past a reported timeout.
pub fn slow_flagging_task(id: &str, delay: Duration, completed: Arc<AtomicBool>) -> Task {
    Task::from_fn(id, id, TaskType::Agent, move || {
        let completed = Arc::clone(&completed);
        async move {
            tokio::time::sleep(delay).await;
            completed.store(true, Ordering::SeqCst);
            Ok(())
        }
    })
}
