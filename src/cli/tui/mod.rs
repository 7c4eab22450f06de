//! Terminal User Interface components

pub mod app;
pub mod event_loop;
pub mod ui;


use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::orchestrator::Orchestrator;

/// Run the Terminal User Interface
pub async fn run_tui(orchestrator: Arc<Orchestrator>, config: AppConfig) -> Result<()> {
    let app = app::App::new(orchestrator, &config);
    event_loop::run_tui_event_loop(app, Duration::from_millis(config.ui.tick_rate_ms.max(10))).await
}
