//! Shutdown coordination for the service.
//!
//! `Shutdown` is held by whoever decides to stop (the signal handler in
//! `main`, the test harness). Everything that must stop with the server holds
//! a `ShutdownSignal`: the HTTP listener and the config update task.

use std::future::Future;

use tokio::sync::broadcast;

/// Trigger side of graceful shutdown.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Stop every subscriber. Calling it again is harmless.
    pub fn trigger(&self) {
        if self.tx.send(()).is_ok() {
            tracing::debug!(subscribers = self.tx.receiver_count(), "Shutdown triggered");
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of graceful shutdown.
///
/// Fires on `Shutdown::trigger` and also when the `Shutdown` is dropped, so a
/// task can never outlive its coordinator.
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
}

impl ShutdownSignal {
    /// Wait until shutdown fires.
    pub async fn recv(&mut self) {
        // Closed and Lagged both mean the trigger has gone off.
        let _ = self.rx.recv().await;
    }

    /// Consume the signal, for APIs that want an owned future.
    pub async fn fired(mut self) {
        self.recv().await;
    }

    /// Run `task` until it finishes or shutdown fires, whichever is first.
    ///
    /// Returns `None` if the task was cut short.
    pub async fn run_until<F: Future>(&mut self, task: F) -> Option<F::Output> {
        tokio::select! {
            output = task => Some(output),
            _ = self.recv() => None,
        }
    }
}

impl Clone for ShutdownSignal {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.resubscribe(),
        }
    }
}
