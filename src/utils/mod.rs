//! Utility functions and helpers used throughout ncd-flasher

pub mod console_events;
pub mod logging;
pub mod process_utils;
