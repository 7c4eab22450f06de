//! Configuration management for the NCD flasher

pub mod app_config;

pub use app_config::*;
