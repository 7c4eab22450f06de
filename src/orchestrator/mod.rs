//! Operation orchestrator
//!
//! Admits one device operation at a time, streams its progress into the
//! log and reconciles the final result into the status banner. All state
//! lives in a `watch` container so any number of views can observe it.

pub mod state;

pub use state::{OrchestratorState, SEPARATOR, StateAction, reconcile};

use chrono::Local;
use std::sync::Arc;
use tokio::sync::watch;

use crate::errors::Result;
use crate::models::{LogEntry, OperationKind, PortInfo};
use crate::progress::{ProgressSource, Subscription};
use crate::services::{DeviceBackend, invoke};

/// Drives device operations and owns the state the UI renders
pub struct Orchestrator {
    state: watch::Sender<OrchestratorState>,
    backend: Arc<dyn DeviceBackend>,
    progress: Arc<dyn ProgressSource>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn DeviceBackend>, progress: Arc<dyn ProgressSource>) -> Self {
        let (state, _) = watch::channel(OrchestratorState::default());
        Self {
            state,
            backend,
            progress,
        }
    }

    /// Observe state changes
    pub fn state(&self) -> watch::Receiver<OrchestratorState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> OrchestratorState {
        self.state.borrow().clone()
    }

    fn dispatch(&self, action: StateAction) -> bool {
        self.state.send_if_modified(|state| state.apply(action))
    }

    pub fn select_port(&self, port: Option<String>) -> bool {
        self.dispatch(StateAction::SelectPort(port))
    }

    pub fn select_firmware(&self, firmware_id: Option<u32>) -> bool {
        self.dispatch(StateAction::SelectFirmware(firmware_id))
    }

    pub fn clear_log(&self) -> bool {
        self.dispatch(StateAction::ClearLog)
    }

    /// Enumerate serial ports through the backend
    pub async fn list_ports(&self) -> Result<Vec<PortInfo>> {
        self.backend.list_ports().await
    }

    pub async fn program(&self) -> bool {
        self.run(OperationKind::Program).await
    }

    pub async fn test(&self) -> bool {
        self.run(OperationKind::Test).await
    }

    pub async fn reset(&self) -> bool {
        self.run(OperationKind::Reset).await
    }

    pub async fn erase(&self) -> bool {
        self.run(OperationKind::Erase).await
    }

    /// Run one operation end to end.
    ///
    /// Returns `false` without touching any state when the operation is not
    /// admitted (incomplete selection or another operation in flight).
    pub async fn run(&self, kind: OperationKind) -> bool {
        let admitted = self.dispatch(StateAction::Begin {
            kind,
            timestamp: Local::now().format("%H:%M:%S").to_string(),
        });
        if !admitted {
            log::debug!("{} not admitted", kind);
            return false;
        }

        // Selection is frozen until Complete, so this read is stable.
        let (port, firmware_id) = {
            let state = self.state.borrow();
            (
                state.selection.port.clone().unwrap_or_default(),
                state.selection.firmware_id.unwrap_or_default(),
            )
        };
        log::info!("{} started on {}", kind, port);

        let channel = kind.channel().unwrap_or_default();
        let mut subscription = match self.progress.subscribe(channel).await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                log::warn!("No live progress for {}: {}", kind, e);
                self.append(format!(
                    "Live progress unavailable ({}), waiting for the final result...",
                    e
                ));
                None
            }
        };

        let outcome = {
            let invocation = invoke(self.backend.as_ref(), kind, &port, firmware_id);
            tokio::pin!(invocation);
            loop {
                tokio::select! {
                    biased;
                    Some(line) = next_line(&mut subscription) => self.append(line),
                    result = &mut invocation => break result,
                }
            }
        };

        if let Some(mut subscription) = subscription.take() {
            while let Some(line) = subscription.try_next_line() {
                self.append(line);
            }
            subscription.cancel();
        }

        match &outcome {
            Ok(result) => log::info!("{} finished: success={} ({})", kind, result.success, result.message),
            Err(e) => log::error!("{} failed: {}", kind, e),
        }
        let (lines, banner) = reconcile(kind, outcome);
        self.dispatch(StateAction::Complete { lines, banner });
        true
    }

    fn append(&self, line: impl Into<String>) {
        self.dispatch(StateAction::Append(LogEntry::new(line)));
    }
}

/// Next streamed line, or never when there is no subscription
async fn next_line(subscription: &mut Option<Subscription>) -> Option<String> {
    match subscription {
        Some(subscription) => subscription.next_line().await,
        None => std::future::pending().await,
    }
}
