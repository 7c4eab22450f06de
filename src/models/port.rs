//! Serial port models

use serde::{Deserialize, Serialize};
use serialport::SerialPortType;

/// A serial port offered for selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    pub name: String,
    pub port_type: String,
}

impl PortInfo {
    pub fn new(name: impl Into<String>, port_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            port_type: port_type.into(),
        }
    }

    /// Text shown in the port list
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.port_type)
    }
}

/// Human readable label for a serialport port type
pub fn port_type_label(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => usb_label(usb.product.as_deref()),
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::Unknown => "Unknown".to_string(),
    }
}

fn usb_label(product: Option<&str>) -> String {
    format!("USB - {}", product.unwrap_or("Unknown"))
}

/// Whether a port should be listed on this platform.
///
/// On macOS every device shows up twice; only the call-out `/dev/cu.*`
/// node is usable for flashing, so `/dev/tty.*` is hidden.
pub fn is_listed_port(name: &str) -> bool {
    if cfg!(target_os = "macos") {
        !name.starts_with("/dev/tty.")
    } else {
        true
    }
}
