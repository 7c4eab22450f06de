//! Parsing of the device console during production test and factory reset

use regex::Regex;
use std::sync::LazyLock;

use crate::models::TestResult;

/// An event the production test has to observe before it passes
struct RequiredEvent {
    marker: &'static str,
    name: &'static str,
    check: &'static str,
}

const REQUIRED_EVENTS: [RequiredEvent; 5] = [
    RequiredEvent {
        marker: "[EVENT:BOOT_COMPLETE]",
        name: "BOOT_COMPLETE",
        check: "Boot complete",
    },
    RequiredEvent {
        marker: "[EVENT:WIFI_CONNECTED]",
        name: "WIFI_CONNECTED",
        check: "WiFi connected",
    },
    RequiredEvent {
        marker: "[EVENT:MQTT_CONNECTED]",
        name: "MQTT_CONNECTED",
        check: "MQTT connected",
    },
    RequiredEvent {
        marker: "[EVENT:SENSOR_OK]",
        name: "SENSOR_OK",
        check: "Sensor OK",
    },
    RequiredEvent {
        marker: "[EVENT:MQTT_PUBLISH_OK]",
        name: "MQTT_PUBLISH_OK",
        check: "MQTT publish OK",
    },
];

/// Line emitted once every required event has been seen
pub const ALL_CHECKS_PASSED: &str = "[CHECK] ✓ All checks passed!";

/// Tracks production events seen on the console.
///
/// The device's own `[EVENT:TEST_PASS]` is ignored: it can fire before
/// MQTT is up, so success is derived from the individual events instead.
#[derive(Debug, Default)]
pub struct TestEventTracker {
    events: Vec<String>,
    seen: [bool; 5],
    firmware_version: Option<String>,
    mac_address: Option<String>,
}

impl TestEventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a console line and return the status lines it produced
    pub fn observe(&mut self, line: &str) -> Vec<String> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }
        self.events.push(line.to_string());

        let mut status = Vec::new();
        let Some(index) = REQUIRED_EVENTS
            .iter()
            .position(|event| line.contains(event.marker))
        else {
            return status;
        };

        if !self.seen[index] {
            self.seen[index] = true;
            status.push(format!("[CHECK] ✓ {}", REQUIRED_EVENTS[index].check));
        }

        if REQUIRED_EVENTS[index].name == "BOOT_COMPLETE" {
            if let Some(fw) = extract_param(line, "FIRMWARE") {
                status.push(format!("[INFO] Firmware: {}", fw));
                self.firmware_version = Some(fw);
            }
            if let Some(mac) = extract_param(line, "MAC") {
                status.push(format!("[INFO] MAC: {}", mac));
                self.mac_address = Some(mac);
            }
        }
        status
    }

    pub fn all_passed(&self) -> bool {
        self.seen.iter().all(|seen| *seen)
    }

    /// Names of the required events not seen yet
    pub fn missing(&self) -> Vec<&'static str> {
        REQUIRED_EVENTS
            .iter()
            .zip(self.seen.iter())
            .filter(|(_, seen)| !**seen)
            .map(|(event, _)| event.name)
            .collect()
    }

    pub fn into_result(self) -> TestResult {
        if self.all_passed() {
            return TestResult {
                success: true,
                message: "All tests passed".to_string(),
                events: self.events,
                firmware_version: self.firmware_version,
                mac_address: self.mac_address,
            };
        }

        let message = format!(
            "Test timed out - missing events: {}",
            self.missing().join(", ")
        );
        TestResult {
            success: false,
            message,
            events: self.events,
            firmware_version: None,
            mac_address: None,
        }
    }
}

/// Whether a console line reports a finished factory reset
pub fn is_reset_complete(line: &str) -> bool {
    line.contains("Factory reset complete") || line.contains("FACTORY_RESET_COMPLETE")
}

/// Whether an esptool output line reports a finished chip erase
pub fn is_erase_complete(line: &str) -> bool {
    line.contains("Chip erase completed")
}

static PARAM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+)=(\S+)").expect("Invalid event parameter regex"));

/// Extract `VALUE` from a `PARAM=VALUE` token in an event line
pub fn extract_param(line: &str, param: &str) -> Option<String> {
    PARAM_PATTERN
        .captures_iter(line)
        .find(|caps| &caps[1] == param)
        .map(|caps| caps[2].to_string())
}
