//! Externally triggered cancellation of a cleanup run.

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable cancellation flag shared between a run and whoever may stop it.
///
/// Once triggered it stays triggered. The cleaner checks it before starting
/// a repository and before each delete request; a request already in flight
/// is allowed to finish so the report matches what the registry did.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Requests cancellation.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
