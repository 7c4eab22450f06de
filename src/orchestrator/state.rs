//! Orchestrator state and its transition function

use crate::errors::Result;
use crate::models::{
    DeviceSelection, FirmwareCatalog, LogEntry, OperationDetails, OperationKind, OperationResult,
    StatusBanner,
};

/// Line appended between streamed output and the result lines
pub const SEPARATOR: &str = "----------------------------------------";

/// Everything the UI renders, owned by the orchestrator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrchestratorState {
    pub operation: OperationKind,
    pub selection: DeviceSelection,
    pub log: Vec<LogEntry>,
    pub banner: StatusBanner,
}

/// A requested change to [`OrchestratorState`]
#[derive(Debug, Clone)]
pub enum StateAction {
    SelectPort(Option<String>),
    SelectFirmware(Option<u32>),
    /// Admission gate plus transition to active
    Begin {
        kind: OperationKind,
        timestamp: String,
    },
    /// A line of operation output; ignored while idle
    Append(LogEntry),
    /// Result lines, final banner and the return to Idle, in one step
    Complete {
        lines: Vec<LogEntry>,
        banner: StatusBanner,
    },
    ClearLog,
}

impl OrchestratorState {
    pub fn is_busy(&self) -> bool {
        !self.operation.is_idle()
    }

    /// Whether an operation would be admitted right now
    pub fn can_start(&self) -> bool {
        !self.is_busy() && self.selection.is_complete()
    }

    /// Apply `action` and report whether the state changed.
    ///
    /// Has no effects outside `self`, so it doubles as the admission check:
    /// a rejected action leaves the state untouched and returns `false`.
    pub fn apply(&mut self, action: StateAction) -> bool {
        match action {
            StateAction::SelectPort(port) => {
                if self.is_busy() || self.selection.port == port {
                    return false;
                }
                self.selection.port = port;
                true
            }
            StateAction::SelectFirmware(firmware_id) => {
                if self.is_busy() || self.selection.firmware_id == firmware_id {
                    return false;
                }
                self.selection.firmware_id = firmware_id;
                true
            }
            StateAction::Begin { kind, timestamp } => {
                if kind.is_idle() || !self.can_start() {
                    return false;
                }
                self.operation = kind;
                self.log.clear();
                self.log.push(LogEntry {
                    timestamp,
                    text: start_line(kind, &self.selection),
                });
                self.banner = StatusBanner::loading(kind);
                true
            }
            StateAction::Append(entry) => {
                if !self.is_busy() || entry.is_blank() {
                    return false;
                }
                self.log.push(entry);
                true
            }
            StateAction::Complete { lines, banner } => {
                if !self.is_busy() {
                    return false;
                }
                self.log.extend(lines.into_iter().filter(|entry| !entry.is_blank()));
                self.banner = banner;
                self.operation = OperationKind::Idle;
                true
            }
            StateAction::ClearLog => {
                if self.log.is_empty() {
                    return false;
                }
                self.log.clear();
                true
            }
        }
    }
}

fn start_line(kind: OperationKind, selection: &DeviceSelection) -> String {
    let port = selection.port.as_deref().unwrap_or_default();
    match (kind, selection.firmware_id) {
        (OperationKind::Program, Some(id)) => format!(
            "Starting {} on {} with firmware {}",
            kind.name().to_lowercase(),
            port,
            FirmwareCatalog::new().label(id)
        ),
        _ => format!("Starting {} on {}", kind.name().to_lowercase(), port),
    }
}

/// Turn the outcome of an invocation into result lines and a final banner
pub fn reconcile(
    kind: OperationKind,
    outcome: Result<OperationResult>,
) -> (Vec<LogEntry>, StatusBanner) {
    let mut lines = vec![LogEntry::new(SEPARATOR)];
    let banner = match outcome {
        Ok(result) if result.success => {
            lines.push(LogEntry::new(format!("SUCCESS: {}", result.message)));
            if let OperationDetails::Test {
                firmware_version,
                mac_address,
                ..
            } = &result.details
            {
                if let Some(version) = firmware_version {
                    lines.push(LogEntry::new(format!("Firmware: {}", version)));
                }
                if let Some(mac) = mac_address {
                    lines.push(LogEntry::new(format!("MAC: {}", mac)));
                }
            }
            StatusBanner::success(format!("{} succeeded: {}", kind.name(), result.message))
        }
        Ok(result) => {
            lines.push(LogEntry::new(format!("FAILED: {}", result.message)));
            StatusBanner::error(format!("{} failed: {}", kind.name(), result.message))
        }
        Err(err) => {
            lines.push(LogEntry::new(format!("ERROR: {}", err)));
            StatusBanner::error(format!("{} error: {}", kind.name(), err))
        }
    };
    (lines, banner)
}
