//! Application configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{FlasherError, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Device backend configuration
    pub backend: BackendConfig,
    /// UI configuration
    pub ui: UiConfig,
}

/// Settings for the native device backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Python interpreter used to run the flasher scripts
    pub python: Option<String>,
    /// Directory holding ncd_flasher.py and esptool.py
    pub flasher_dir: Option<PathBuf>,
    /// Chip passed to esptool for erase
    pub chip: String,
    /// Baud rate for the test and factory reset console
    pub baud_rate: u32,
    /// Production test timeout in seconds
    pub test_timeout_secs: u64,
    /// Factory reset timeout in seconds
    pub reset_timeout_secs: u64,
}

/// UI-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// TUI redraw tick in milliseconds
    pub tick_rate_ms: u64,
    /// Firmware preselected on startup
    pub default_firmware_id: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            python: None,
            flasher_dir: None,
            chip: "esp32".to_string(),
            baud_rate: 115200,
            test_timeout_secs: 60,
            reset_timeout_secs: 30,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            default_firmware_id: 1,
        }
    }
}

impl BackendConfig {
    pub fn test_timeout(&self) -> Duration {
        Duration::from_secs(self.test_timeout_secs)
    }

    pub fn reset_timeout(&self) -> Duration {
        Duration::from_secs(self.reset_timeout_secs)
    }
}

impl AppConfig {
    /// Default location: `<config dir>/ncd-flasher/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ncd-flasher").join("config.toml"))
    }

    /// Load configuration from an explicit path, or the default location.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    log::debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FlasherError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
