//! Mock device backend and progress source
//!
//! Scripts one invocation outcome plus the progress lines emitted before it
//! resolves, and journals subscribe/invoke/cancel calls so tests can check
//! their ordering.

#![allow(dead_code)]

use async_trait::async_trait;
use ncd_flasher::errors::{FlasherError, Result};
use ncd_flasher::models::{FlashResult, OperationKind, PortInfo, ResetResult, TestResult};
use ncd_flasher::progress::{ProgressSource, Subscription};
use ncd_flasher::services::DeviceBackend;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, mpsc};

/// Shared record of calls in the order they happened
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct ProgressInner {
    listeners: Mutex<Vec<(String, mpsc::UnboundedSender<String>)>>,
    subscribes: AtomicUsize,
    cancels: AtomicUsize,
    fail: AtomicBool,
}

/// Progress source that counts subscriptions and cancellations
#[derive(Clone, Default)]
pub struct MockProgress {
    inner: Arc<ProgressInner>,
    journal: Journal,
}

impl MockProgress {
    pub fn new(journal: Journal) -> Self {
        Self {
            inner: Arc::default(),
            journal,
        }
    }

    /// Make every following subscribe call fail
    pub fn fail_subscriptions(&self) {
        self.inner.fail.store(true, Ordering::SeqCst);
    }

    pub fn emit(&self, channel: &str, line: &str) {
        for (name, tx) in self.inner.listeners.lock().unwrap().iter() {
            if name == channel {
                let _ = tx.send(line.to_string());
            }
        }
    }

    pub fn subscribes(&self) -> usize {
        self.inner.subscribes.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> usize {
        self.inner.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProgressSource for MockProgress {
    async fn subscribe(&self, channel: &str) -> Result<Subscription> {
        if self.inner.fail.load(Ordering::SeqCst) {
            self.journal.push("subscribe-failed");
            return Err(FlasherError::Progress("event bridge unavailable".to_string()));
        }
        self.inner.subscribes.fetch_add(1, Ordering::SeqCst);
        self.journal.push(format!("subscribe:{}", channel));

        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .listeners
            .lock()
            .unwrap()
            .push((channel.to_string(), tx));

        let inner = Arc::clone(&self.inner);
        let journal = self.journal.clone();
        Ok(Subscription::new(rx, move || {
            inner.cancels.fetch_add(1, Ordering::SeqCst);
            journal.push("cancel");
        }))
    }
}

/// How the scripted invocation resolves
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Success(String),
    Failure(String),
    Transport(String),
}

/// Device backend replaying a scripted outcome
pub struct MockBackend {
    progress: MockProgress,
    journal: Journal,
    lines: Vec<String>,
    outcome: MockOutcome,
    firmware_version: Option<String>,
    mac_address: Option<String>,
    gate: Option<Arc<Notify>>,
    ports: Vec<PortInfo>,
    pub calls: Mutex<Vec<(OperationKind, String, u32)>>,
}

impl MockBackend {
    pub fn new(progress: MockProgress, journal: Journal, outcome: MockOutcome) -> Self {
        Self {
            progress,
            journal,
            lines: Vec::new(),
            outcome,
            firmware_version: None,
            mac_address: None,
            gate: None,
            ports: vec![
                PortInfo::new("/dev/ttyUSB0", "USB - CP2102 USB to UART Bridge Controller"),
                PortInfo::new("/dev/ttyS0", "PCI"),
            ],
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Lines emitted on the operation's channel before resolving
    pub fn with_lines(mut self, lines: &[&str]) -> Self {
        self.lines = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_test_details(mut self, firmware: &str, mac: &str) -> Self {
        self.firmware_version = Some(firmware.to_string());
        self.mac_address = Some(mac.to_string());
        self
    }

    /// Hold every invocation until `gate` is notified
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn perform(&self, kind: OperationKind, port: &str, firmware_id: u32) -> Result<(bool, String)> {
        self.calls
            .lock()
            .unwrap()
            .push((kind, port.to_string(), firmware_id));
        self.journal.push(format!("invoke:{}", kind.name()));

        if let Some(channel) = kind.channel() {
            for line in &self.lines {
                self.progress.emit(channel, line);
            }
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match &self.outcome {
            MockOutcome::Success(message) => Ok((true, message.clone())),
            MockOutcome::Failure(message) => Ok((false, message.clone())),
            MockOutcome::Transport(detail) => Err(FlasherError::Transport(detail.clone())),
        }
    }
}

#[async_trait]
impl DeviceBackend for MockBackend {
    async fn list_ports(&self) -> Result<Vec<PortInfo>> {
        Ok(self.ports.clone())
    }

    async fn flash(&self, port: &str, firmware_id: u32) -> Result<FlashResult> {
        let (success, message) = self.perform(OperationKind::Program, port, firmware_id).await?;
        Ok(FlashResult {
            success,
            message,
            output: self.lines.join("\n"),
        })
    }

    async fn test(&self, port: &str) -> Result<TestResult> {
        let (success, message) = self.perform(OperationKind::Test, port, 0).await?;
        Ok(TestResult {
            success,
            message,
            events: Vec::new(),
            firmware_version: self.firmware_version.clone(),
            mac_address: self.mac_address.clone(),
        })
    }

    async fn reset(&self, port: &str) -> Result<ResetResult> {
        let (success, message) = self.perform(OperationKind::Reset, port, 0).await?;
        Ok(ResetResult { success, message })
    }

    async fn erase(&self, port: &str) -> Result<ResetResult> {
        let (success, message) = self.perform(OperationKind::Erase, port, 0).await?;
        Ok(ResetResult { success, message })
    }
}
