//! Service state machine.

use std::fmt;

use tokio::sync::watch;

/// Lifecycle states of the service.
///
/// ```text
/// Starting → Running → ShuttingDown → Stopped
///     └──────────┴──────────────────────↗ (start failure, server died)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

impl ServiceState {
    pub fn can_transition_to(self, next: ServiceState) -> bool {
        use ServiceState::*;
        matches!(
            (self, next),
            (Starting, Running)
                | (Starting, Stopped)
                | (Running, ShuttingDown)
                | (Running, Stopped)
                | (ShuttingDown, Stopped)
        )
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceState::Starting => "starting",
            ServiceState::Running => "running",
            ServiceState::ShuttingDown => "shutting_down",
            ServiceState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Observable holder of the current state.
#[derive(Debug)]
pub struct StateCell {
    tx: watch::Sender<ServiceState>,
}

impl StateCell {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ServiceState::Starting);
        Self { tx }
    }

    pub fn get(&self) -> ServiceState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ServiceState> {
        self.tx.subscribe()
    }

    /// Move to `next`. Refused transitions are logged and leave the state
    /// unchanged.
    pub fn transition(&self, next: ServiceState) -> bool {
        self.tx.send_if_modified(|current| {
            if current.can_transition_to(next) {
                tracing::info!(from = %current, to = %next, "Service state changed");
                *current = next;
                true
            } else {
                tracing::warn!(from = %current, to = %next, "Refused service state transition");
                false
            }
        })
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
