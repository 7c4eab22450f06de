//! Custom error types for the NCD flasher

use std::fmt;

/// Main error type for device operations and their plumbing
#[derive(Debug)]
pub enum FlasherError {
    /// Configuration related errors
    Config(String),
    /// Serial port could not be opened or driven
    Serial(String),
    /// External flasher / esptool process errors
    Process(String),
    /// Remote call failed before producing a result
    Transport(String),
    /// Progress channel errors
    Progress(String),
    /// General I/O errors
    Io(std::io::Error),
    /// Serialization errors
    Serialization(String),
}

impl fmt::Display for FlasherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlasherError::Config(msg) => write!(f, "Configuration error: {}", msg),
            FlasherError::Serial(msg) => write!(f, "Serial port error: {}", msg),
            FlasherError::Process(msg) => write!(f, "Process error: {}", msg),
            FlasherError::Transport(msg) => write!(f, "Transport error: {}", msg),
            FlasherError::Progress(msg) => write!(f, "Progress channel error: {}", msg),
            FlasherError::Io(err) => write!(f, "I/O error: {}", err),
            FlasherError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for FlasherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlasherError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FlasherError {
    fn from(err: std::io::Error) -> Self {
        FlasherError::Io(err)
    }
}

impl From<serialport::Error> for FlasherError {
    fn from(err: serialport::Error) -> Self {
        FlasherError::Serial(err.to_string())
    }
}

impl From<serde_json::Error> for FlasherError {
    fn from(err: serde_json::Error) -> Self {
        FlasherError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for FlasherError {
    fn from(err: toml::de::Error) -> Self {
        FlasherError::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for FlasherError {
    fn from(err: tokio::task::JoinError) -> Self {
        FlasherError::Transport(format!("Task join error: {}", err))
    }
}

/// Result type alias for flasher operations
pub type Result<T> = std::result::Result<T, FlasherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_keeps_detail() {
        let err = FlasherError::Transport("ECONNRESET".to_string());
        assert_eq!(err.to_string(), "Transport error: ECONNRESET");
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error;
        let err: FlasherError = std::io::Error::other("boom").into();
        assert!(err.source().is_some());
        assert!(err.to_string().contains("boom"));
    }
}
