//! Progress event bridge
//!
//! Long-running device operations stream their console output on a named
//! channel (one per operation kind). The orchestrator subscribes to the
//! channel before issuing the invocation call and cancels the subscription
//! once the call resolves.

pub mod hub;

pub use hub::ProgressHub;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::Result;

/// Source of per-channel progress lines
#[async_trait]
pub trait ProgressSource: Send + Sync {
    /// Start receiving lines emitted on `channel`.
    ///
    /// Every call returns an independent subscription with its own
    /// cancellation handle.
    async fn subscribe(&self, channel: &str) -> Result<Subscription>;
}

type CancelFn = Box<dyn FnOnce() + Send>;

/// A live progress subscription.
///
/// Lines arrive in emission order. The cancellation handle runs at most
/// once: either through [`Subscription::cancel`] or when the subscription
/// is dropped.
pub struct Subscription {
    lines: mpsc::UnboundedReceiver<String>,
    cancel: Option<CancelFn>,
}

impl Subscription {
    pub fn new(
        lines: mpsc::UnboundedReceiver<String>,
        cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            lines,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Wait for the next line; `None` once the source side is gone
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    /// Take an already delivered line without waiting
    pub fn try_next_line(&mut self) -> Option<String> {
        self.lines.try_recv().ok()
    }

    /// Stop the subscription and release the listener
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            self.lines.close();
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_cancel_runs_exactly_once() {
        let cancels = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::unbounded_channel();
        let counter = cancels.clone();
        let mut subscription = Subscription::new(rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tx.send("Connecting...".to_string()).unwrap();
        assert_eq!(subscription.next_line().await.as_deref(), Some("Connecting..."));

        subscription.cancel();
        assert_eq!(cancels.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_cancels_uncancelled_subscription() {
        let cancels = Arc::new(AtomicUsize::new(0));
        let (_tx, rx) = mpsc::unbounded_channel();
        let counter = cancels.clone();
        let subscription = Subscription::new(rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(subscription);
        assert_eq!(cancels.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_try_next_line_drains_buffered_lines() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscription = Subscription::new(rx, || {});
        tx.send("a".to_string()).unwrap();
        tx.send("b".to_string()).unwrap();
        assert_eq!(subscription.try_next_line().as_deref(), Some("a"));
        assert_eq!(subscription.try_next_line().as_deref(), Some("b"));
        assert_eq!(subscription.try_next_line(), None);
    }
}
