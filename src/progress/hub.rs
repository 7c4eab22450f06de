//! In-process progress hub used by the native backend

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc;

use super::{ProgressSource, Subscription};
use crate::errors::{FlasherError, Result};

struct Listener {
    id: u64,
    channel: String,
    tx: mpsc::UnboundedSender<String>,
}

#[derive(Default)]
struct HubState {
    next_id: u64,
    listeners: Vec<Listener>,
    closed: bool,
}

/// Fans emitted lines out to the listeners of each named channel
#[derive(Clone, Default)]
pub struct ProgressHub {
    state: Arc<Mutex<HubState>>,
}

fn lock(state: &Mutex<HubState>) -> MutexGuard<'_, HubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ProgressHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `line` to every live listener on `channel`.
    ///
    /// Fire-and-forget: returns how many listeners received it.
    pub fn emit(&self, channel: &str, line: impl Into<String>) -> usize {
        let line = line.into();
        let mut state = lock(&self.state);
        state
            .listeners
            .retain(|listener| !listener.tx.is_closed());

        let mut delivered = 0;
        for listener in state.listeners.iter().filter(|l| l.channel == channel) {
            if listener.tx.send(line.clone()).is_ok() {
                delivered += 1;
            }
        }
        log::trace!("[{}] {} ({} listener(s))", channel, line, delivered);
        delivered
    }

    /// Register a new listener on `channel`
    pub fn listen(&self, channel: &str) -> Result<Subscription> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut state = lock(&self.state);
            if state.closed {
                return Err(FlasherError::Progress(format!(
                    "progress hub closed, cannot listen on '{}'",
                    channel
                )));
            }
            state.next_id += 1;
            let id = state.next_id;
            state.listeners.push(Listener {
                id,
                channel: channel.to_string(),
                tx,
            });
            id
        };

        log::debug!("Progress listener {} attached to '{}'", id, channel);
        let weak: Weak<Mutex<HubState>> = Arc::downgrade(&self.state);
        let channel = channel.to_string();
        Ok(Subscription::new(rx, move || {
            if let Some(state) = weak.upgrade() {
                lock(&state).listeners.retain(|listener| listener.id != id);
                log::debug!("Progress listener {} detached from '{}'", id, channel);
            }
        }))
    }

    /// Refuse new subscriptions and drop the current listeners
    pub fn close(&self) {
        let mut state = lock(&self.state);
        state.closed = true;
        state.listeners.clear();
    }

    /// Number of live listeners on `channel`
    pub fn listener_count(&self, channel: &str) -> usize {
        lock(&self.state)
            .listeners
            .iter()
            .filter(|listener| listener.channel == channel && !listener.tx.is_closed())
            .count()
    }
}

#[async_trait]
impl ProgressSource for ProgressHub {
    async fn subscribe(&self, channel: &str) -> Result<Subscription> {
        self.listen(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lines_arrive_in_order() {
        let hub = ProgressHub::new();
        let mut sub = hub.subscribe("flash-output").await.unwrap();

        for line in ["Connecting...", "Erasing...", "Writing 50%"] {
            assert_eq!(hub.emit("flash-output", line), 1);
        }

        assert_eq!(sub.next_line().await.as_deref(), Some("Connecting..."));
        assert_eq!(sub.next_line().await.as_deref(), Some("Erasing..."));
        assert_eq!(sub.next_line().await.as_deref(), Some("Writing 50%"));
    }

    #[tokio::test]
    async fn test_channels_are_isolated() {
        let hub = ProgressHub::new();
        let mut flash = hub.subscribe("flash-output").await.unwrap();

        assert_eq!(hub.emit("test-output", "[EVENT:BOOT_COMPLETE]"), 0);
        hub.emit("flash-output", "Status: Success");

        assert_eq!(flash.try_next_line().as_deref(), Some("Status: Success"));
        assert_eq!(flash.try_next_line(), None);
    }

    #[tokio::test]
    async fn test_cancel_only_detaches_its_own_listener() {
        let hub = ProgressHub::new();
        let first = hub.subscribe("erase-output").await.unwrap();
        let mut second = hub.subscribe("erase-output").await.unwrap();
        assert_eq!(hub.listener_count("erase-output"), 2);

        first.cancel();
        assert_eq!(hub.listener_count("erase-output"), 1);

        assert_eq!(hub.emit("erase-output", "Chip erase completed"), 1);
        assert_eq!(second.try_next_line().as_deref(), Some("Chip erase completed"));
    }

    #[tokio::test]
    async fn test_closed_hub_rejects_subscriptions() {
        let hub = ProgressHub::new();
        hub.close();
        let err = hub.subscribe("reset-output").await.unwrap_err();
        assert!(matches!(err, FlasherError::Progress(_)));
        assert_eq!(hub.emit("reset-output", "ignored"), 0);
    }
}
