//! Firmware catalog understood by the NCD flasher script

use serde::Serialize;

/// A firmware image the flasher script can download and write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Firmware {
    pub id: u32,
    pub name: &'static str,
}

const CATALOG: &[Firmware] = &[
    Firmware { id: 1, name: "WiFi AWS Gateway" },
    Firmware { id: 2, name: "WiFi Azure Gateway" },
    Firmware { id: 3, name: "WiFi MQTT Gateway" },
    Firmware { id: 4, name: "WiFi Google IoT Gateway" },
    Firmware { id: 5, name: "Mega Modem" },
    Firmware { id: 6, name: "Cellular MQTT Gateway" },
    Firmware { id: 7, name: "Losant Gateway" },
    Firmware { id: 8, name: "4 Relay MirPro" },
    Firmware { id: 9, name: "AWS WiFi Sensor" },
    Firmware { id: 10, name: "MQTT WiFi Sensor" },
    Firmware { id: 11, name: "Mirror PR53-4" },
    Firmware { id: 12, name: "Azure WiFi Sensor" },
    Firmware { id: 13, name: "Contact Closure Email Generator" },
    Firmware { id: 14, name: "ESP XBee" },
    Firmware { id: 15, name: "WiFi Azure Gateway Custom" },
    Firmware { id: 16, name: "4-20mA Input Transmitter 4 channel" },
    Firmware { id: 17, name: "Radon MN" },
    Firmware { id: 18, name: "0-10VDC Input Transmitter 4 channel" },
    Firmware { id: 19, name: "Goodtech 4 channel" },
    Firmware { id: 20, name: "SOTA Relay" },
    Firmware { id: 21, name: "Goodtech 2 relay 2 dac" },
    Firmware { id: 22, name: "RFID" },
    Firmware { id: 23, name: "MQTT V2 Temperature/Humidity Sensor" },
    Firmware { id: 24, name: "SOTA PWM" },
    Firmware { id: 25, name: "8 Input Mirror Transmitter" },
    Firmware { id: 26, name: "Firmware Flasher" },
    Firmware { id: 27, name: "Smart Repeater 2" },
    Firmware { id: 28, name: "MQTT V2 Current Monitor Sensor" },
    Firmware { id: 29, name: "4-20mA 4 Channel Output Receiver" },
    Firmware { id: 30, name: "MQTT V2 Push Notification" },
];

/// Static lookup of firmware id to display name
#[derive(Debug, Clone, Copy, Default)]
pub struct FirmwareCatalog;

impl FirmwareCatalog {
    pub fn new() -> Self {
        Self
    }

    pub fn all(&self) -> &'static [Firmware] {
        CATALOG
    }

    pub fn get(&self, id: u32) -> Option<&'static Firmware> {
        CATALOG.iter().find(|fw| fw.id == id)
    }

    /// Display label used in lists and log lines, e.g. "23: MQTT V2 ..."
    pub fn label(&self, id: u32) -> String {
        match self.get(id) {
            Some(fw) => format!("{}: {}", fw.id, fw.name),
            None => format!("{}: (unknown firmware)", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_contiguous() {
        let catalog = FirmwareCatalog::new();
        let ids: Vec<u32> = catalog.all().iter().map(|fw| fw.id).collect();
        assert_eq!(ids, (1..=30).collect::<Vec<_>>());
    }

    #[test]
    fn test_lookup_and_label() {
        let catalog = FirmwareCatalog::new();
        assert_eq!(
            catalog.get(23).map(|fw| fw.name),
            Some("MQTT V2 Temperature/Humidity Sensor")
        );
        assert!(catalog.get(31).is_none());
        assert_eq!(catalog.label(5), "5: Mega Modem");
        assert_eq!(catalog.label(99), "99: (unknown firmware)");
    }
}
