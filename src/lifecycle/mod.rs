//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Bind listener → Spawn accept loop → Running
//!
//! Signals (signals.rs):
//!     SIGINT → Trigger graceful shutdown
//!     second SIGINT during shutdown → Forced exit
//!
//! Shutdown (shutdown.rs, startup.rs):
//!     Stop accepting → Drain connections and handlers → Stopped
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then listener, then accept loop
//! - Shutdown has timeout: grace period expiry is fatal
//! - Every error surfaced here ends the process

pub mod error;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use error::LifecycleError;
pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{start, RunningService};
pub use state::ServiceState;

use crate::config::DiagConfig;

/// Run the service until interrupted, then shut it down.
pub async fn run(config: DiagConfig) -> Result<(), LifecycleError> {
    let mut service = start(config).await?;
    tracing::info!(address = %service.local_addr(), "Service running");

    service.run_until(signals::interrupt()).await?;

    tokio::select! {
        result = service.shutdown() => result,
        signal = signals::interrupt() => {
            signal.map_err(LifecycleError::Signal)?;
            tracing::warn!("Second interrupt received during shutdown");
            Err(LifecycleError::ForcedExit)
        }
    }
}
