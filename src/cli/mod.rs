//! Command Line Interface module
//!
//! This module contains the CLI argument parsing, command implementations,
//! and the Terminal User Interface (TUI) components.

pub mod args;
pub mod commands;
pub mod tui;

pub use args::*;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::orchestrator::Orchestrator;
use crate::progress::ProgressHub;
use crate::services::NativeBackend;
use crate::utils::logging::init_cli_logging;

/// Main CLI application runner
pub async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_cli_logging(cli.verbose, cli.quiet, cli.is_tui())?;

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let orchestrator = Arc::new(build_orchestrator(&config));

    match cli.command.clone() {
        Some(command) => commands::execute_command(command, &orchestrator, &config).await,
        None => tui::run_tui(orchestrator, config).await,
    }
}

/// Wire the native backend and the progress hub into an orchestrator
pub fn build_orchestrator(config: &AppConfig) -> Orchestrator {
    let hub = ProgressHub::new();
    let backend = NativeBackend::new(config.backend.clone(), hub.clone());
    Orchestrator::new(Arc::new(backend), Arc::new(hub))
}
