//! Ports command implementation - List serial ports

use anyhow::{Context, Result};
use log::info;

use crate::orchestrator::Orchestrator;

/// Execute the ports command
pub async fn execute_ports_command(orchestrator: &Orchestrator, json: bool) -> Result<()> {
    info!("Scanning for serial ports...");
    let ports = orchestrator
        .list_ports()
        .await
        .context("Failed to list serial ports")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }

    if ports.is_empty() {
        println!("⚠️  No serial ports detected");
        return Ok(());
    }

    println!("🔍 Detected Serial Ports:");
    println!("========================\n");
    for port in &ports {
        println!("  {}", port.display_label());
    }
    Ok(())
}
