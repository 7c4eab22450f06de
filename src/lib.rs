//! ncd-flasher - ESP32 operation orchestrator for NCD sensor devices
//!
//! Flashes firmware, runs the production test, performs a factory reset
//! or erases the flash of an ESP32 over USB-serial, one operation at a
//! time, from a terminal UI or the command line.

pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod selection;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use errors::*;
pub use models::*;
pub use orchestrator::{Orchestrator, OrchestratorState};

/// ncd-flasher version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// ncd-flasher application name
pub const APP_NAME: &str = "ncd-flasher";
