//! Port list kept in sync with the orchestrator's port selection

use crate::models::PortInfo;

/// Most recently enumerated serial ports
#[derive(Debug, Clone, Default)]
pub struct PortList {
    ports: Vec<PortInfo>,
}

impl PortList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ports(&self) -> &[PortInfo] {
        &self.ports
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Replace the list and return the port that should be selected.
    ///
    /// `current` survives a refresh when it is still present; otherwise
    /// the first listed port is chosen, or none when the list is empty.
    pub fn update(&mut self, ports: Vec<PortInfo>, current: Option<&str>) -> Option<String> {
        self.ports = ports;
        match current {
            Some(name) if self.position(name).is_some() => Some(name.to_string()),
            _ => self.ports.first().map(|p| p.name.clone()),
        }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.ports.iter().position(|p| p.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&PortInfo> {
        self.ports.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(names: &[&str]) -> Vec<PortInfo> {
        names
            .iter()
            .map(|n| PortInfo::new(n.to_string(), "USB - CP2102".to_string()))
            .collect()
    }

    #[test]
    fn test_first_port_selected_when_nothing_chosen() {
        let mut list = PortList::new();
        let selected = list.update(ports(&["/dev/ttyUSB0", "/dev/ttyUSB1"]), None);
        assert_eq!(selected.as_deref(), Some("/dev/ttyUSB0"));
    }

    #[test]
    fn test_current_selection_kept_when_still_present() {
        let mut list = PortList::new();
        let selected = list.update(
            ports(&["/dev/ttyUSB0", "/dev/ttyUSB1"]),
            Some("/dev/ttyUSB1"),
        );
        assert_eq!(selected.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(list.position("/dev/ttyUSB1"), Some(1));
    }

    #[test]
    fn test_vanished_port_falls_back_to_first() {
        let mut list = PortList::new();
        let selected = list.update(ports(&["/dev/ttyACM0"]), Some("/dev/ttyUSB1"));
        assert_eq!(selected.as_deref(), Some("/dev/ttyACM0"));
    }

    #[test]
    fn test_empty_list_clears_selection() {
        let mut list = PortList::new();
        assert_eq!(list.update(Vec::new(), Some("/dev/ttyUSB0")), None);
        assert!(list.is_empty());
    }
}
