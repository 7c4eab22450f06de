//! CLI command implementations

pub mod firmware;
pub mod operation;
pub mod ports;

use anyhow::Result;
use std::sync::Arc;

use crate::cli::args::Commands;
use crate::config::AppConfig;
use crate::models::OperationKind;
use crate::orchestrator::Orchestrator;

/// Execute a CLI command
pub async fn execute_command(
    command: Commands,
    orchestrator: &Arc<Orchestrator>,
    config: &AppConfig,
) -> Result<()> {
    let default_firmware = config.ui.default_firmware_id;
    match command {
        Commands::Ports { json } => ports::execute_ports_command(orchestrator, json).await,
        Commands::Firmware { json } => firmware::execute_firmware_command(json),
        Commands::Flash { port, firmware } => {
            operation::execute_operation(orchestrator, OperationKind::Program, port, firmware).await
        }
        Commands::Test { port, firmware } => {
            operation::execute_operation(
                orchestrator,
                OperationKind::Test,
                port,
                firmware.unwrap_or(default_firmware),
            )
            .await
        }
        Commands::Reset { port, firmware } => {
            operation::execute_operation(
                orchestrator,
                OperationKind::Reset,
                port,
                firmware.unwrap_or(default_firmware),
            )
            .await
        }
        Commands::Erase {
            port,
            firmware,
            yes,
        } => {
            if !operation::confirm_erase(&port, yes)? {
                println!("Erase cancelled");
                return Ok(());
            }
            operation::execute_operation(
                orchestrator,
                OperationKind::Erase,
                port,
                firmware.unwrap_or(default_firmware),
            )
            .await
        }
    }
}
