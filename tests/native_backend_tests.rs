//! Native Backend Tests
//!
//! Runs the script-driven operations against stand-in shell scripts placed
//! in a temporary flasher directory.

#![cfg(unix)]

use ncd_flasher::config::BackendConfig;
use ncd_flasher::models::OperationKind;
use ncd_flasher::progress::ProgressHub;
use ncd_flasher::services::{DeviceBackend, NativeBackend};
use ncd_flasher::utils::process_utils::{ESPTOOL_SCRIPT, FLASHER_SCRIPT};
use std::fs;
use tempfile::TempDir;

fn backend_with_script(script: &str, body: &str) -> (NativeBackend, ProgressHub, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    fs::write(dir.path().join(script), body).expect("Failed to write script");

    let config = BackendConfig {
        python: Some("sh".to_string()),
        flasher_dir: Some(dir.path().to_path_buf()),
        ..BackendConfig::default()
    };
    let hub = ProgressHub::new();
    (NativeBackend::new(config, hub.clone()), hub, dir)
}

#[tokio::test]
async fn test_flash_streams_output_and_checks_status() {
    let (backend, hub, _dir) = backend_with_script(
        FLASHER_SCRIPT,
        "echo \"Flashing $2 with firmware $4\"\necho 'Status: Success'\n",
    );
    let mut sub = hub
        .listen(OperationKind::Program.channel().unwrap())
        .unwrap();

    let result = backend.flash("/dev/ttyUSB0", 23).await.unwrap();

    assert!(result.success);
    assert_eq!(result.message, "Firmware flashed successfully");
    assert!(result.output.contains("Flashing /dev/ttyUSB0 with firmware 23"));
    assert_eq!(
        sub.try_next_line().as_deref(),
        Some("Flashing /dev/ttyUSB0 with firmware 23")
    );
    assert_eq!(sub.try_next_line().as_deref(), Some("Status: Success"));
}

#[tokio::test]
async fn test_flash_without_success_marker_fails() {
    let (backend, _hub, _dir) = backend_with_script(FLASHER_SCRIPT, "echo 'Status: Failed'\n");

    let result = backend.flash("/dev/ttyUSB0", 1).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.message, "Firmware flash failed");
}

#[tokio::test]
async fn test_flash_nonzero_exit_fails() {
    let (backend, _hub, _dir) =
        backend_with_script(FLASHER_SCRIPT, "echo 'Status: Success'\nexit 2\n");

    let result = backend.flash("/dev/ttyUSB0", 1).await.unwrap();
    assert!(!result.success);
}

#[tokio::test]
async fn test_erase_passes_chip_and_port() {
    let (backend, hub, _dir) = backend_with_script(
        ESPTOOL_SCRIPT,
        "echo \"chip=$2 port=$4 cmd=$5\"\necho 'Chip erase completed successfully in 4.2s' >&2\n",
    );
    let mut sub = hub.listen(OperationKind::Erase.channel().unwrap()).unwrap();

    let result = backend.erase("/dev/ttyUSB0").await.unwrap();
    assert!(result.success);
    assert_eq!(result.message, "Flash erased successfully");

    let mut lines = Vec::new();
    while let Some(line) = sub.try_next_line() {
        lines.push(line);
    }
    assert_eq!(lines.first().map(String::as_str), Some("Starting flash erase..."));
    assert!(lines.contains(&"chip=esp32 port=/dev/ttyUSB0 cmd=erase_flash".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("[CHECK] ✓ Flash erase complete"));
}

#[tokio::test]
async fn test_unopenable_port_is_an_error() {
    let backend = NativeBackend::new(BackendConfig::default(), ProgressHub::new());
    let err = backend.test("/dev/ncd-flasher-no-such-port").await.unwrap_err();
    assert!(err.to_string().contains("/dev/ncd-flasher-no-such-port"));
}
