//! TUI-specific data models

/// Which pane is currently focused in the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPane {
    #[default]
    PortList,
    FirmwareList,
    LogPane,
}

impl FocusedPane {
    /// Next pane in Tab order
    pub fn next(self) -> Self {
        match self {
            FocusedPane::PortList => FocusedPane::FirmwareList,
            FocusedPane::FirmwareList => FocusedPane::LogPane,
            FocusedPane::LogPane => FocusedPane::PortList,
        }
    }
}
