//! Device operation invoker interface
//!
//! Each operation is a single request/response call that resolves once the
//! device work has fully finished. Progress is never carried by the return
//! value; implementations stream it on the operation's progress channel.

use async_trait::async_trait;

use crate::errors::{FlasherError, Result};
use crate::models::{FlashResult, OperationKind, OperationResult, PortInfo, ResetResult, TestResult};

/// Backend that performs device operations on a serial port.
///
/// Implementations must not retry internally; a failed call is reported
/// once and retrying is up to the user.
#[async_trait]
pub trait DeviceBackend: Send + Sync {
    /// Enumerate serial ports available for selection
    async fn list_ports(&self) -> Result<Vec<PortInfo>>;

    /// Download and write firmware `firmware_id` to the device on `port`
    async fn flash(&self, port: &str, firmware_id: u32) -> Result<FlashResult>;

    /// Run the production test sequence
    async fn test(&self, port: &str) -> Result<TestResult>;

    /// Restore factory defaults
    async fn reset(&self, port: &str) -> Result<ResetResult>;

    /// Erase the whole flash
    async fn erase(&self, port: &str) -> Result<ResetResult>;
}

/// Issue the invocation call for `kind` and normalize its result
pub async fn invoke(
    backend: &dyn DeviceBackend,
    kind: OperationKind,
    port: &str,
    firmware_id: u32,
) -> Result<OperationResult> {
    match kind {
        OperationKind::Program => backend.flash(port, firmware_id).await.map(Into::into),
        OperationKind::Test => backend.test(port).await.map(Into::into),
        OperationKind::Reset => backend.reset(port).await.map(OperationResult::reset),
        OperationKind::Erase => backend.erase(port).await.map(OperationResult::erase),
        OperationKind::Idle => Err(FlasherError::Transport(
            "no device operation to invoke".to_string(),
        )),
    }
}
