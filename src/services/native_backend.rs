//! Native device backend
//!
//! Flashing and erasing are delegated to the bundled Python scripts
//! (`ncd_flasher.py` and `esptool.py`); the production test and factory
//! reset talk to the device console directly over the serial port.

use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::time::Instant;
use tokio_serial::{SerialPort, SerialStream};

use super::device_backend::DeviceBackend;
use crate::config::BackendConfig;
use crate::errors::{FlasherError, Result};
use crate::models::{FlashResult, OperationKind, PortInfo, ResetResult, TestResult};
use crate::models::port::{is_listed_port, port_type_label};
use crate::progress::ProgressHub;
use crate::utils::console_events::{
    ALL_CHECKS_PASSED, TestEventTracker, is_erase_complete, is_reset_complete,
};
use crate::utils::process_utils::{self, ESPTOOL_SCRIPT, FLASHER_SCRIPT};

/// Delay after dropping DTR/RTS before talking to the console
const LINE_SETTLE: Duration = Duration::from_millis(50);

/// Device backend driving real serial ports and the flasher scripts
#[derive(Clone)]
pub struct NativeBackend {
    config: BackendConfig,
    progress: ProgressHub,
}

impl NativeBackend {
    pub fn new(config: BackendConfig, progress: ProgressHub) -> Self {
        Self { config, progress }
    }

    fn emit(&self, kind: OperationKind, line: impl Into<String>) {
        if let Some(channel) = kind.channel() {
            self.progress.emit(channel, line);
        }
    }

    /// Open the device console without resetting the ESP32.
    ///
    /// On ESP32 boards RTS drives EN and DTR drives GPIO0, so both are held
    /// low to keep the chip running its application.
    async fn open_console(&self, port: &str) -> Result<SerialStream> {
        let builder = tokio_serial::new(port, self.config.baud_rate)
            .timeout(Duration::from_millis(100));
        let mut serial = SerialStream::open(&builder).map_err(|e| {
            FlasherError::Serial(format!("Failed to open serial port {}: {}", port, e))
        })?;

        if let Err(e) = serial.write_data_terminal_ready(false) {
            log::warn!("Failed to clear DTR on {}: {}", port, e);
        }
        if let Err(e) = serial.write_request_to_send(false) {
            log::warn!("Failed to clear RTS on {}: {}", port, e);
        }
        tokio::time::sleep(LINE_SETTLE).await;
        Ok(serial)
    }

    async fn send_command(serial: &mut SerialStream, command: &str) -> Result<()> {
        serial
            .write_all(format!("{}\r\n", command).as_bytes())
            .await
            .map_err(|e| {
                FlasherError::Serial(format!("Failed to send {} command: {}", command, e))
            })?;
        serial
            .flush()
            .await
            .map_err(|e| FlasherError::Serial(format!("Failed to flush: {}", e)))
    }

    /// Follow the console of a device running its production test
    async fn watch_test<R>(&self, console: R, deadline: Instant) -> Result<TestResult>
    where
        R: AsyncRead + Unpin,
    {
        let mut tracker = TestEventTracker::new();
        read_console_until(console, deadline, |line| {
            self.emit(OperationKind::Test, line);
            for status in tracker.observe(line) {
                self.emit(OperationKind::Test, status);
            }
            if tracker.all_passed() {
                self.emit(OperationKind::Test, ALL_CHECKS_PASSED);
                return true;
            }
            false
        })
        .await?;
        Ok(tracker.into_result())
    }

    async fn watch_reset<R>(&self, console: R, deadline: Instant) -> Result<ResetResult>
    where
        R: AsyncRead + Unpin,
    {
        let complete = read_console_until(console, deadline, |line| {
            self.emit(OperationKind::Reset, line);
            if is_reset_complete(line) {
                self.emit(OperationKind::Reset, "[CHECK] ✓ Factory reset complete");
                return true;
            }
            false
        })
        .await?;

        Ok(ResetResult {
            success: complete,
            message: if complete {
                "Factory reset completed successfully".to_string()
            } else {
                "Factory reset timed out or failed".to_string()
            },
        })
    }
}

/// Read console lines until `deadline`, handing each non-empty one to
/// `on_line`; stops early when `on_line` returns `true`.
///
/// The console closing before either happens is a serial error.
async fn read_console_until<R, F>(console: R, deadline: Instant, mut on_line: F) -> Result<bool>
where
    R: AsyncRead + Unpin,
    F: FnMut(&str) -> bool,
{
    let mut lines = BufReader::new(console).lines();
    loop {
        match tokio::time::timeout_at(deadline, lines.next_line()).await {
            Err(_) => return Ok(false),
            Ok(Ok(Some(line))) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() && on_line(trimmed) {
                    return Ok(true);
                }
            }
            Ok(Ok(None)) => {
                return Err(FlasherError::Serial(
                    "Serial port closed while reading the device console".to_string(),
                ));
            }
            Ok(Err(e)) if e.kind() == io::ErrorKind::TimedOut => continue,
            Ok(Err(e)) => return Err(FlasherError::Serial(format!("Read error: {}", e))),
        }
    }
}

#[async_trait]
impl DeviceBackend for NativeBackend {
    async fn list_ports(&self) -> Result<Vec<PortInfo>> {
        let ports = tokio::task::spawn_blocking(serialport::available_ports)
            .await?
            .map_err(|e| FlasherError::Serial(format!("Failed to list serial ports: {}", e)))?;

        let ports: Vec<PortInfo> = ports
            .into_iter()
            .filter(|p| is_listed_port(&p.port_name))
            .map(|p| PortInfo::new(p.port_name.clone(), port_type_label(&p.port_type)))
            .collect();
        log::debug!("Found {} serial port(s)", ports.len());
        Ok(ports)
    }

    async fn flash(&self, port: &str, firmware_id: u32) -> Result<FlashResult> {
        let script = process_utils::locate_script(self.config.flasher_dir.as_deref(), FLASHER_SCRIPT)?;
        let script_dir = script
            .parent()
            .ok_or_else(|| FlasherError::Process("Could not get script directory".to_string()))?
            .to_path_buf();
        let python = process_utils::python_command(self.config.python.as_deref())?;

        log::info!(
            "Flashing firmware {} to {} with {}",
            firmware_id,
            port,
            script.display()
        );
        let mut cmd = Command::new(python);
        cmd.arg(&script)
            .arg("--port")
            .arg(port)
            .arg("--firmware")
            .arg(firmware_id.to_string())
            .current_dir(&script_dir);

        let output = process_utils::run_streaming(
            cmd,
            &self.progress,
            OperationKind::Program.channel().unwrap_or_default(),
        )
        .await?;
        let combined = output.combined();
        let success = output.status.success() && combined.contains("Status: Success");

        Ok(FlashResult {
            success,
            message: if success {
                "Firmware flashed successfully".to_string()
            } else {
                "Firmware flash failed".to_string()
            },
            output: combined,
        })
    }

    async fn test(&self, port: &str) -> Result<TestResult> {
        let mut serial = self.open_console(port).await?;
        Self::send_command(&mut serial, "TEST").await?;
        log::info!("Production test started on {}", port);

        let deadline = Instant::now() + self.config.test_timeout();
        let result = self.watch_test(serial, deadline).await?;
        log::info!("Production test on {}: {}", port, result.message);
        Ok(result)
    }

    async fn reset(&self, port: &str) -> Result<ResetResult> {
        let mut serial = self.open_console(port).await?;
        Self::send_command(&mut serial, "FACTORY_RESET").await?;
        self.emit(OperationKind::Reset, "Sent FACTORY_RESET command...");

        let deadline = Instant::now() + self.config.reset_timeout();
        self.watch_reset(serial, deadline).await
    }

    async fn erase(&self, port: &str) -> Result<ResetResult> {
        let esptool = process_utils::locate_script(self.config.flasher_dir.as_deref(), ESPTOOL_SCRIPT)?;
        let script_dir = esptool
            .parent()
            .ok_or_else(|| FlasherError::Process("Could not get script directory".to_string()))?
            .to_path_buf();
        let python = process_utils::python_command(self.config.python.as_deref())?;

        self.emit(OperationKind::Erase, "Starting flash erase...");
        let mut cmd = Command::new(python);
        cmd.arg(&esptool)
            .arg("--chip")
            .arg(&self.config.chip)
            .arg("--port")
            .arg(port)
            .arg("erase_flash")
            .current_dir(&script_dir);

        let output = process_utils::run_streaming(
            cmd,
            &self.progress,
            OperationKind::Erase.channel().unwrap_or_default(),
        )
        .await?;
        let success =
            output.lines.iter().any(|line| is_erase_complete(line)) || output.status.success();

        if success {
            self.emit(OperationKind::Erase, "[CHECK] ✓ Flash erase complete");
        }
        Ok(ResetResult {
            success,
            message: if success {
                "Flash erased successfully".to_string()
            } else {
                "Flash erase failed".to_string()
            },
        })
    }
}
