//! Operation, log and status models shared by the orchestrator and the UI

use chrono::Local;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// The device operation currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperationKind {
    #[default]
    Idle,
    Program,
    Test,
    Reset,
    Erase,
}

impl OperationKind {
    /// Every operation that can be started (Idle excluded)
    pub const ACTIVE: [OperationKind; 4] = [
        OperationKind::Program,
        OperationKind::Test,
        OperationKind::Reset,
        OperationKind::Erase,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Idle => "Idle",
            OperationKind::Program => "Program",
            OperationKind::Test => "Test",
            OperationKind::Reset => "Factory reset",
            OperationKind::Erase => "Erase",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            OperationKind::Idle => "No operation in progress",
            OperationKind::Program => "Flash the selected firmware to the device",
            OperationKind::Test => "Run the production test sequence",
            OperationKind::Reset => "Restore the device configuration to factory defaults",
            OperationKind::Erase => "Wipe the entire flash of the device",
        }
    }

    /// Name of the progress channel this operation streams on
    pub fn channel(&self) -> Option<&'static str> {
        match self {
            OperationKind::Idle => None,
            OperationKind::Program => Some("flash-output"),
            OperationKind::Test => Some("test-output"),
            OperationKind::Reset => Some("reset-output"),
            OperationKind::Erase => Some("erase-output"),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, OperationKind::Idle)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Port and firmware picked by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSelection {
    pub port: Option<String>,
    pub firmware_id: Option<u32>,
}

impl DeviceSelection {
    pub fn new(port: impl Into<String>, firmware_id: u32) -> Self {
        Self {
            port: Some(port.into()),
            firmware_id: Some(firmware_id),
        }
    }

    /// Both a non-empty port and a firmware id are present
    pub fn is_complete(&self) -> bool {
        self.port.as_deref().is_some_and(|p| !p.trim().is_empty()) && self.firmware_id.is_some()
    }
}

/// One line in the operation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub text: String,
}

impl LogEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            text: text.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp, self.text)
    }
}

/// Operation-specific payload of a finished invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationDetails {
    Program {
        output: String,
    },
    Test {
        events: Vec<String>,
        firmware_version: Option<String>,
        mac_address: Option<String>,
    },
    Reset,
    Erase,
}

/// Result of a completed invocation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    pub details: OperationDetails,
}

/// Result returned by the flasher script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashResult {
    pub success: bool,
    pub message: String,
    pub output: String,
}

/// Result of the production test sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub success: bool,
    pub message: String,
    pub events: Vec<String>,
    pub firmware_version: Option<String>,
    pub mac_address: Option<String>,
}

/// Result of a factory reset or flash erase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResult {
    pub success: bool,
    pub message: String,
}

impl From<FlashResult> for OperationResult {
    fn from(result: FlashResult) -> Self {
        Self {
            success: result.success,
            message: result.message,
            details: OperationDetails::Program {
                output: result.output,
            },
        }
    }
}

impl From<TestResult> for OperationResult {
    fn from(result: TestResult) -> Self {
        Self {
            success: result.success,
            message: result.message,
            details: OperationDetails::Test {
                events: result.events,
                firmware_version: result.firmware_version,
                mac_address: result.mac_address,
            },
        }
    }
}

impl OperationResult {
    pub fn reset(result: ResetResult) -> Self {
        Self {
            success: result.success,
            message: result.message,
            details: OperationDetails::Reset,
        }
    }

    pub fn erase(result: ResetResult) -> Self {
        Self {
            success: result.success,
            message: result.message,
            details: OperationDetails::Erase,
        }
    }
}

/// Banner classification with visual indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusKind {
    #[default]
    Idle,
    Success,
    Error,
    Loading,
}

impl StatusKind {
    pub fn color(&self) -> Color {
        match self {
            StatusKind::Idle => Color::Gray,
            StatusKind::Success => Color::Green,
            StatusKind::Error => Color::Red,
            StatusKind::Loading => Color::Yellow,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            StatusKind::Idle => "⏸ ",
            StatusKind::Success => "✅",
            StatusKind::Error => "❌",
            StatusKind::Loading => "⏳",
        }
    }
}

/// Status line shown above the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBanner {
    pub message: String,
    pub kind: StatusKind,
}

impl StatusBanner {
    pub fn idle() -> Self {
        Self {
            message: "Ready".to_string(),
            kind: StatusKind::Idle,
        }
    }

    pub fn loading(operation: OperationKind) -> Self {
        Self {
            message: format!("{} starting...", operation.name()),
            kind: StatusKind::Loading,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Error,
        }
    }
}

impl Default for StatusBanner {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_requires_port_and_firmware() {
        assert!(!DeviceSelection::default().is_complete());
        assert!(
            !DeviceSelection {
                port: Some("/dev/ttyUSB0".to_string()),
                firmware_id: None,
            }
            .is_complete()
        );
        assert!(!DeviceSelection::new("  ", 3).is_complete());
        assert!(DeviceSelection::new("/dev/ttyUSB0", 23).is_complete());
    }

    #[test]
    fn test_each_operation_has_its_own_channel() {
        let channels: Vec<_> = OperationKind::ACTIVE
            .iter()
            .filter_map(|kind| kind.channel())
            .collect();
        assert_eq!(
            channels,
            vec!["flash-output", "test-output", "reset-output", "erase-output"]
        );
        assert_eq!(OperationKind::Idle.channel(), None);
    }

    #[test]
    fn test_loading_banner_names_operation() {
        let banner = StatusBanner::loading(OperationKind::Program);
        assert_eq!(banner.kind, StatusKind::Loading);
        assert_eq!(banner.message, "Program starting...");
    }

    #[test]
    fn test_log_entry_display_has_timestamp_prefix() {
        let entry = LogEntry {
            timestamp: "12:00:01".to_string(),
            text: "Connecting...".to_string(),
        };
        assert_eq!(entry.to_string(), "[12:00:01] Connecting...");
        assert!(LogEntry::new(" \t ").is_blank());
    }
}
