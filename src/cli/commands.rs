// ABOUTME: Command implementations for the conductor CLI
// ABOUTME: Builds an engine from a manifest and drives run, validate, export, and schedule

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::Config;
use crate::engine::{RecurringScheduler, TaskExecutor, TaskRegistry, WorkflowEngine};
use crate::export;
use crate::manifest::Manifest;

/// Load a manifest and register its contents into a fresh engine instance.
async fn build_engine(manifest_path: &Path, config: &Config) -> Result<(Manifest, WorkflowEngine)> {
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("failed to load manifest {}", manifest_path.display()))?;

    let registry = Arc::new(TaskRegistry::new());
    let executor = Arc::new(TaskExecutor::with_history_capacity(
        registry,
        config.history_capacity,
    ));
    let engine = WorkflowEngine::new(executor);

    manifest.register_into(&engine).await?;
    Ok((manifest, engine))
}

pub async fn run_command(
    manifest_path: PathBuf,
    workflow_id: Option<String>,
    task_id: Option<String>,
    config: &Config,
) -> Result<()> {
    let (_, engine) = build_engine(&manifest_path, config).await?;

    match (workflow_id, task_id) {
        (Some(workflow_id), _) => {
            let results = engine.execute_workflow(&workflow_id).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        (None, Some(task_id)) => {
            let result = engine.executor().execute(&task_id).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        (None, None) => bail!("specify --workflow or --task"),
    }

    let stats = engine.stats().await;
    eprintln!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

pub async fn validate_command(manifest_path: PathBuf) -> Result<()> {
    let manifest = Manifest::load(&manifest_path)
        .with_context(|| format!("failed to load manifest {}", manifest_path.display()))?;
    manifest.validate()?;

    println!(
        "Manifest is valid: {} task(s), {} workflow(s), {} scheduled",
        manifest.tasks.len(),
        manifest.workflows.len(),
        manifest.scheduled_tasks().len()
    );
    Ok(())
}

pub async fn export_command(
    manifest_path: PathBuf,
    workflow_id: String,
    format: String,
    config: &Config,
) -> Result<()> {
    let (_, engine) = build_engine(&manifest_path, config).await?;

    let workflow = engine.get_workflow(&workflow_id).await?;
    let mut tasks = Vec::with_capacity(workflow.tasks.len());
    for task_id in &workflow.tasks {
        tasks.push(engine.executor().registry().get(task_id).await?);
    }

    let exporter = export::exporter_for(&format)?;
    println!("{}", exporter.export(&workflow, &tasks)?);
    Ok(())
}

pub async fn schedule_command(manifest_path: PathBuf, config: &Config) -> Result<()> {
    let (manifest, engine) = build_engine(&manifest_path, config).await?;

    let scheduled = manifest.scheduled_tasks();
    if scheduled.is_empty() {
        bail!("manifest declares no scheduled tasks");
    }

    let scheduler = RecurringScheduler::new(Arc::clone(engine.executor()));
    for (task_id, expression) in &scheduled {
        scheduler.schedule(task_id, expression).await?;
    }

    info!(count = scheduled.len(), "Recurring tasks started, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    scheduler.clear();
    let stats = engine.stats().await;
    eprintln!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
