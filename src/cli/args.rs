// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for conductor

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "conductor")]
#[command(about = "A task and workflow execution engine with retries, timeouts, and schedules")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a workflow or a single task from a manifest
    Run {
        #[arg(help = "Path to manifest YAML file")]
        manifest: PathBuf,

        #[arg(short, long, help = "Workflow id to execute")]
        workflow: Option<String>,

        #[arg(short, long, help = "Task id to execute")]
        task: Option<String>,
    },

    /// Validate a manifest file without executing
    Validate {
        #[arg(help = "Path to manifest YAML file")]
        manifest: PathBuf,
    },

    /// Project a workflow into an external scheduling format
    Export {
        #[arg(help = "Path to manifest YAML file")]
        manifest: PathBuf,

        #[arg(help = "Workflow id to export")]
        workflow: String,

        #[arg(short, long, default_value = "statemachine", help = "Export format (cron, statemachine)")]
        format: String,
    },

    /// Run every scheduled task in a manifest until interrupted
    Schedule {
        #[arg(help = "Path to manifest YAML file")]
        manifest: PathBuf,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
