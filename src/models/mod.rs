//! Data models and types used throughout the flasher

pub mod events;
pub mod firmware;
pub mod operation;
pub mod port;
pub mod tui;

// Re-export commonly used types
pub use events::*;
pub use firmware::*;
pub use operation::*;
pub use port::PortInfo;
pub use tui::*;
