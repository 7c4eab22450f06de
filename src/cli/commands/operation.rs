//! Device operation commands (flash, test, reset, erase)

use anyhow::{Result, bail};
use log::debug;
use tokio::sync::watch;

use crate::models::{FirmwareCatalog, LogEntry, OperationKind, StatusKind};
use crate::orchestrator::{Orchestrator, OrchestratorState};

/// Select `port`/`firmware_id`, run `kind` and print the log as it grows.
///
/// Fails for an unknown firmware id, when the operation is not admitted or
/// when it ends with an error banner.
pub async fn execute_operation(
    orchestrator: &Orchestrator,
    kind: OperationKind,
    port: String,
    firmware_id: u32,
) -> Result<()> {
    if FirmwareCatalog::new().get(firmware_id).is_none() {
        bail!(
            "Unknown firmware id {} (run `ncd-flasher firmware` to list them)",
            firmware_id
        );
    }
    orchestrator.select_port(Some(port));
    orchestrator.select_firmware(Some(firmware_id));

    let (admitted, state) = run_and_follow(orchestrator, kind, |entry| println!("{}", entry)).await;
    if !admitted {
        bail!("{} was not started: port and firmware must both be selected", kind.name());
    }

    match state.banner.kind {
        StatusKind::Error => bail!("{}", state.banner.message),
        _ => {
            println!("{} {}", state.banner.kind.symbol(), state.banner.message);
            Ok(())
        }
    }
}

/// Run `kind` and hand every new log entry to `on_entry` in order.
///
/// Returns whether the operation was admitted and the final state.
pub async fn run_and_follow<F>(
    orchestrator: &Orchestrator,
    kind: OperationKind,
    mut on_entry: F,
) -> (bool, OrchestratorState)
where
    F: FnMut(&LogEntry),
{
    let mut rx = orchestrator.state();
    let mut printed = rx.borrow_and_update().log.len();

    let run = orchestrator.run(kind);
    tokio::pin!(run);

    let admitted = loop {
        tokio::select! {
            admitted = &mut run => break admitted,
            Ok(()) = rx.changed() => print_new(&mut rx, &mut printed, &mut on_entry),
        }
    };
    print_new(&mut rx, &mut printed, &mut on_entry);
    debug!("{} finished, admitted: {}", kind, admitted);

    (admitted, orchestrator.snapshot())
}

fn print_new<F>(rx: &mut watch::Receiver<OrchestratorState>, printed: &mut usize, on_entry: &mut F)
where
    F: FnMut(&LogEntry),
{
    let state = rx.borrow_and_update();
    // Log is cleared when an operation starts
    if state.log.len() < *printed {
        *printed = 0;
    }
    for entry in &state.log[*printed..] {
        on_entry(entry);
    }
    *printed = state.log.len();
}

/// Ask before erasing unless `--yes` was given
pub fn confirm_erase(port: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(format!(
            "Erase the entire flash of the device on {}? This cannot be undone",
            port
        ))
        .default(false)
        .interact()?;
    Ok(confirmed)
}
