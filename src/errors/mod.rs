//! Error handling for the NCD flasher

pub mod types;

pub use types::*;
