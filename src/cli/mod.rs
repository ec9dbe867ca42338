// ABOUTME: Command line interface module for conductor
// ABOUTME: Exports application, argument, and configuration types

pub mod app;
pub mod args;
pub mod commands;
pub mod config;

pub use app::App;
pub use args::{Args, Commands};
pub use config::{Config, LoggingConfig};
