//! Device services
//!
//! The invoker interface the orchestrator talks to, and the native
//! implementation backed by serial ports and the flasher scripts.

pub mod device_backend;
pub mod native_backend;

pub use device_backend::*;
pub use native_backend::*;
