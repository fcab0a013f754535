//! One-way readiness gate flipped by the first successful load.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Shared "first load finished" flag.
///
/// Cloning shares the same gate. Once ready, it stays ready.
#[derive(Debug, Clone)]
pub struct ReadyGate {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ReadyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadyGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Flip the gate. Later calls are no-ops.
    pub fn mark_ready(&self) {
        if !self.tx.send_replace(true) {
            debug!("readiness gate opened");
        }
    }

    /// Resolve once ready. Always yields at least once, so it never completes
    /// within the caller's current turn.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // the sender lives as long as `self`, so this cannot observe a closed channel
        let _ = rx.wait_for(|ready| *ready).await;
        tokio::task::yield_now().await;
    }

    /// Run `listener` on a spawned task once ready. Listeners registered after
    /// readiness still run asynchronously on a later scheduling turn.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_ready<F>(&self, listener: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let gate = self.clone();
        tokio::spawn(async move {
            gate.wait().await;
            listener();
        })
    }
}
