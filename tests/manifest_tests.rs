// ABOUTME: Integration tests for manifest loading, registration, and export projections
// ABOUTME: Uses real command handlers (true/false) through a temp manifest file

mod common;

use std::fs;

use conductor::engine::TaskStatus;
use conductor::export::exporter_for;
use conductor::manifest::Manifest;
use tempfile::tempdir;

use common::test_engine;

const MANIFEST: &str = r#"
tasks:
  always_ok:
    name: Always succeeds
    type: agent
    command: "true"
    schedule: every 5 minutes
  always_fails:
    name: Always fails
    command: "false"
    retries: 0
  missing_binary:
    command: /nonexistent/conductor-test-binary

workflows:
  happy:
    tasks: [always_ok]
  mixed:
    tasks: [always_fails, always_ok]
    on_failure: continue
  halting:
    tasks: [always_fails, always_ok]
"#;

#[tokio::test]
async fn test_load_manifest_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pipeline.yaml");
    fs::write(&path, MANIFEST).unwrap();

    let manifest = Manifest::load(&path).unwrap();
    assert_eq!(manifest.tasks.len(), 3);
    assert_eq!(manifest.workflows.len(), 3);
    assert!(manifest.validate().is_ok());
}

#[tokio::test]
async fn test_registered_command_task_succeeds() {
    let manifest = Manifest::parse(MANIFEST).unwrap();
    let engine = test_engine();
    manifest.register_into(&engine).await.unwrap();

    let results = engine.execute_workflow("happy").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, TaskStatus::Success);
}

#[tokio::test]
async fn test_failing_command_classified_as_failed() {
    let manifest = Manifest::parse(MANIFEST).unwrap();
    let engine = test_engine();
    manifest.register_into(&engine).await.unwrap();

    let result = engine.executor().execute("always_fails").await.unwrap();
    assert_eq!(result.status, TaskStatus::Failed);
    assert!(result.error.as_deref().unwrap().contains("exited with"));
}

#[tokio::test]
async fn test_unspawnable_command_classified_as_failed() {
    let manifest = Manifest::parse(MANIFEST).unwrap();
    let engine = test_engine();
    manifest.register_into(&engine).await.unwrap();

    let result = engine.executor().execute("missing_binary").await.unwrap();
    assert_eq!(result.status, TaskStatus::Failed);
    assert!(result.error.as_deref().unwrap().contains("failed to spawn"));
}

#[tokio::test]
async fn test_continue_workflow_runs_past_failure() {
    let manifest = Manifest::parse(MANIFEST).unwrap();
    let engine = test_engine();
    manifest.register_into(&engine).await.unwrap();

    let results = engine.execute_workflow("mixed").await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, TaskStatus::Failed);
    assert_eq!(results[1].status, TaskStatus::Success);
}

#[tokio::test]
async fn test_stop_workflow_halts_on_command_failure() {
    let manifest = Manifest::parse(MANIFEST).unwrap();
    let engine = test_engine();
    manifest.register_into(&engine).await.unwrap();

    let results = engine.execute_workflow("halting").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, TaskStatus::Failed);
}

#[tokio::test]
async fn test_export_registered_workflow() {
    let manifest = Manifest::parse(MANIFEST).unwrap();
    let engine = test_engine();
    manifest.register_into(&engine).await.unwrap();

    let workflow = engine.get_workflow("happy").await.unwrap();
    let mut tasks = Vec::new();
    for task_id in &workflow.tasks {
        tasks.push(engine.executor().registry().get(task_id).await.unwrap());
    }

    let cron = exporter_for("cron").unwrap().export(&workflow, &tasks).unwrap();
    assert!(cron.contains("*/5 * * * * conductor run --task always_ok"));

    let statemachine = exporter_for("statemachine")
        .unwrap()
        .export(&workflow, &tasks)
        .unwrap();
    let doc: serde_json::Value = serde_json::from_str(&statemachine).unwrap();
    assert_eq!(doc["start_at"], "always_ok");
    assert_eq!(doc["states"]["always_ok"]["end"], true);
}

#[tokio::test]
async fn test_rejects_unknown_reference_on_register() {
    let manifest = Manifest::parse(
        r#"
tasks:
  a:
    command: "true"
workflows:
  w:
    tasks: [a, ghost]
"#,
    )
    .unwrap();

    let engine = test_engine();
    let err = manifest.register_into(&engine).await.unwrap_err();
    assert!(err.to_string().contains("unknown task 'ghost'"));

    // Nothing was registered.
    assert_eq!(engine.executor().registry().len().await, 0);
    assert_eq!(engine.workflow_count().await, 0);
}
