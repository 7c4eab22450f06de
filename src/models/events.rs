//! Application events for the TUI event loop

use crate::models::{OperationKind, PortInfo};

/// Events delivered to the TUI from background tasks
#[derive(Debug)]
pub enum AppEvent {
    // Port enumeration
    PortsRefreshed(Vec<PortInfo>),
    PortRefreshFailed(String),

    // Operation task ended; `admitted` is false when the gate rejected it
    OperationEnded(OperationKind, bool),

    // General events
    Tick,
}
