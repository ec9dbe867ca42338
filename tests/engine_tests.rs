// ABOUTME: Integration tests for the task executor, retry/backoff, and history
// ABOUTME: Timer-heavy cases run with a paused clock so backoff delays are instant

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use conductor::engine::{backoff_delay, EngineError, TaskStatus, TaskType};
use tokio::time::Instant;

use common::*;

#[tokio::test]
async fn test_unknown_task_fails_fast() {
    let engine = test_engine();
    let err = engine.executor().execute("ghost").await.unwrap_err();
    assert!(matches!(err, EngineError::TaskNotFound { .. }));
    assert_eq!(engine.executor().history_len().await, 0);
}

#[tokio::test]
async fn test_successful_execution_is_recorded() {
    let engine = test_engine();
    let calls = call_counter();
    engine
        .executor()
        .registry()
        .register(succeeding_task("ok", Arc::clone(&calls)))
        .await;

    let result = engine.executor().execute("ok").await.unwrap();

    assert_eq!(result.status, TaskStatus::Success);
    assert_eq!(result.task_id, "ok");
    assert_eq!(result.retry_count, 0);
    assert!(result.error.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(engine.executor().history_len().await, 1);
}

#[tokio::test]
async fn test_failure_without_retries_yields_single_failed_result() {
    let engine = test_engine();
    let calls = call_counter();
    engine
        .executor()
        .registry()
        .register(failing_task("bad", "boom", Arc::clone(&calls)))
        .await;

    let result = engine.executor().execute("bad").await.unwrap();

    assert_eq!(result.status, TaskStatus::Failed);
    assert_eq!(result.error.as_deref(), Some("boom"));
    assert_eq!(result.retry_count, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Exactly one terminal entry, no retry-status entries.
    let history = engine.executor().recent_results(100).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, TaskStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_retries_exhaust_with_exponential_backoff() {
    let engine = test_engine();
    let calls = call_counter();
    engine
        .executor()
        .registry()
        .register(failing_task("flaky", "boom", Arc::clone(&calls)).with_retries(2))
        .await;

    let started = Instant::now();
    let result = engine.executor().execute("flaky").await.unwrap();
    let elapsed = started.elapsed();

    // Final attempt's outcome is what the caller sees.
    assert_eq!(result.status, TaskStatus::Failed);
    assert_eq!(result.error.as_deref(), Some("boom"));
    assert_eq!(result.retry_count, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    // Two backoff delays occurred: 1000ms then 2000ms.
    assert!(elapsed >= Duration::from_millis(3000));

    // Only the final result reaches history.
    assert_eq!(engine.executor().history_len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_delays_strictly_increase() {
    let engine = test_engine();
    let timestamps: Arc<std::sync::Mutex<Vec<Instant>>> =
        Arc::new(std::sync::Mutex::new(Vec::new()));

    let stamps = Arc::clone(&timestamps);
    engine
        .executor()
        .registry()
        .register(
            conductor::engine::Task::from_fn("flaky", "flaky", TaskType::Agent, move || {
                let stamps = Arc::clone(&stamps);
                async move {
                    stamps.lock().unwrap().push(Instant::now());
                    Err(anyhow::anyhow!("boom"))
                }
            })
            .with_retries(3),
        )
        .await;

    engine.executor().execute("flaky").await.unwrap();

    let stamps = timestamps.lock().unwrap();
    assert_eq!(stamps.len(), 4);
    let mut previous_gap = Duration::ZERO;
    for (k, pair) in stamps.windows(2).enumerate() {
        let gap = pair[1] - pair[0];
        assert!(gap >= backoff_delay(k as u32));
        assert!(gap > previous_gap);
        previous_gap = gap;
    }
}

#[tokio::test(start_paused = true)]
async fn test_success_after_transient_failures() {
    let engine = test_engine();
    let calls = call_counter();

    let attempts = Arc::clone(&calls);
    engine
        .executor()
        .registry()
        .register(
            conductor::engine::Task::from_fn("eventually", "eventually", TaskType::Agent, move || {
                let attempts = Arc::clone(&attempts);
                async move {
                    if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(anyhow::anyhow!("not yet"))
                    } else {
                        Ok(())
                    }
                }
            })
            .with_retries(5),
        )
        .await;

    let result = engine.executor().execute("eventually").await.unwrap();

    assert_eq!(result.status, TaskStatus::Success);
    assert_eq!(result.retry_count, 2);
    assert!(result.error.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_timeout_reported_without_cancelling_handler() {
    let engine = test_engine();
    let completed = Arc::new(AtomicBool::new(false));
    engine
        .executor()
        .registry()
        .register(
            slow_flagging_task("slow", Duration::from_millis(200), Arc::clone(&completed))
                .with_timeout_ms(50),
        )
        .await;

    let result = engine.executor().execute("slow").await.unwrap();

    assert_eq!(result.status, TaskStatus::Timeout);
    assert!(result.error.as_deref().unwrap().contains("timed out after 50ms"));
    // Reported duration reflects the timeout, not the handler's runtime.
    assert!(result.duration_ms >= 40);
    assert!(result.duration_ms < 150);
    assert!(!completed.load(Ordering::SeqCst));

    // The handler was not torn down; it finishes in the background.
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(completed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_panicking_handler_classified_as_failed() {
    let engine = test_engine();
    engine
        .executor()
        .registry()
        .register(conductor::engine::Task::from_fn(
            "panicky",
            "panicky",
            TaskType::Agent,
            || async { panic!("kaboom") },
        ))
        .await;

    let result = engine.executor().execute("panicky").await.unwrap();
    assert_eq!(result.status, TaskStatus::Failed);
    assert!(result.error.is_some());
}

#[tokio::test]
async fn test_history_capacity_evicts_oldest() {
    let engine = test_engine_with_capacity(5);
    let calls = call_counter();
    engine
        .executor()
        .registry()
        .register(succeeding_task("ok", calls))
        .await;

    for _ in 0..8 {
        engine.executor().execute("ok").await.unwrap();
    }

    assert_eq!(engine.executor().history_len().await, 5);
    let stats = engine.executor().history_stats().await;
    assert_eq!(stats.total_executions, 5);
    assert_eq!(stats.success_rate, 100.0);
}

#[tokio::test]
async fn test_zero_history_capacity_still_records() {
    // A capacity of 0 is reachable from configuration; execution must
    // complete and keep the single most recent result.
    let engine = test_engine_with_capacity(0);
    let calls = call_counter();
    engine
        .executor()
        .registry()
        .register(succeeding_task("ok", calls))
        .await;

    engine.executor().execute("ok").await.unwrap();
    engine.executor().execute("ok").await.unwrap();

    assert_eq!(engine.executor().history_len().await, 1);
}

#[tokio::test]
async fn test_history_stats_are_windowed() {
    let engine = test_engine_with_capacity(2);
    let calls = call_counter();
    engine
        .executor()
        .registry()
        .register(failing_task("bad", "boom", Arc::clone(&calls)))
        .await;
    engine
        .executor()
        .registry()
        .register(succeeding_task("ok", calls))
        .await;

    engine.executor().execute("bad").await.unwrap();
    engine.executor().execute("ok").await.unwrap();
    engine.executor().execute("ok").await.unwrap();

    // The failed entry fell out of the window, so the rate is computed only
    // over the surviving successes.
    let stats = engine.executor().history_stats().await;
    assert_eq!(stats.total_executions, 2);
    assert_eq!(stats.success_rate, 100.0);
}
