//! Shutdown trigger shared by the controller and the server task.
//!
//! The flag lives in a watch channel, so a subscriber created after the
//! trigger still sees it, and dropping the controller counts as a trigger.

use tokio::sync::watch;

/// Controller side of the shutdown flag.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

/// Server side of the shutdown flag.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Raise the flag. Returns `false` if it was already raised.
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|raised| !std::mem::replace(raised, true))
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolve once shutdown is triggered or the controller is gone.
    pub async fn wait(mut self) {
        let _ = self.rx.wait_for(|raised| *raised).await;
    }
}
