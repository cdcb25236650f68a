//! Startup orchestration and the running-service handle.
//!
//! # Responsibilities
//! - Validate configuration
//! - Bind the listener and hand it to a background task
//! - Wait for the interrupt, then drive a bounded graceful shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - `start` binds before returning, so bind failures reach the caller
//! - `shutdown` consumes the handle and can only run once

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

use crate::config::{validate_config, DiagConfig};
use crate::http::HttpServer;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::state::{ServiceState, StateCell};
use crate::net::{listener, InFlightTracker};

type ServerResult = Result<std::io::Result<()>, JoinError>;

/// Start the service.
///
/// Returns once the listener is bound and the accept loop runs on a
/// background task.
pub async fn start(config: DiagConfig) -> Result<RunningService, LifecycleError> {
    let state = StateCell::new();

    if let Err(errors) = validate_config(&config) {
        state.transition(ServiceState::Stopped);
        return Err(LifecycleError::InvalidConfig(errors));
    }

    let listener = match listener::bind(&config.listener).await {
        Ok(listener) => listener,
        Err(e) => {
            state.transition(ServiceState::Stopped);
            return Err(e.into());
        }
    };
    let local_addr = listener
        .local_addr()
        .map_err(LifecycleError::Serve)?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config);
    let tracker = server.tracker();
    let server = tokio::spawn(server.run(listener, shutdown.subscribe()));

    state.transition(ServiceState::Running);

    Ok(RunningService {
        local_addr,
        state,
        shutdown,
        tracker,
        server: Some(server),
        grace: config.lifecycle.grace_period(),
    })
}

/// Handle to a started service.
///
/// Dropping it without calling [`RunningService::shutdown`] still stops the
/// accept loop, but does not wait for in-flight handlers.
#[derive(Debug)]
pub struct RunningService {
    local_addr: SocketAddr,
    state: StateCell,
    shutdown: Shutdown,
    tracker: InFlightTracker,
    /// `None` once the server task has been awaited.
    server: Option<JoinHandle<std::io::Result<()>>>,
    grace: Duration,
}

impl RunningService {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ServiceState {
        self.state.get()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ServiceState> {
        self.state.subscribe()
    }

    pub fn in_flight(&self) -> u64 {
        self.tracker.in_flight()
    }

    /// Block until `trigger` completes.
    ///
    /// Fails if the trigger itself fails or if the server task ends first;
    /// both are fatal.
    pub async fn run_until<F>(&mut self, trigger: F) -> Result<(), LifecycleError>
    where
        F: Future<Output = std::io::Result<()>>,
    {
        let Some(server) = self.server.as_mut() else {
            return Err(LifecycleError::ServerExited);
        };

        let exited = tokio::select! {
            signal = trigger => {
                signal.map_err(LifecycleError::Signal)?;
                None
            }
            result = server => Some(result),
        };

        match exited {
            None => Ok(()),
            Some(result) => {
                self.server = None;
                self.state.transition(ServiceState::Stopped);
                match server_error(result) {
                    Ok(()) => Err(LifecycleError::ServerExited),
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Stop accepting, let in-flight handlers finish, and stop.
    ///
    /// Bounded by the configured grace period; running out of time aborts
    /// the server task and is an error.
    pub async fn shutdown(mut self) -> Result<(), LifecycleError> {
        if !self.state.transition(ServiceState::ShuttingDown) {
            return Ok(());
        }
        tracing::info!(
            in_flight = self.tracker.in_flight(),
            grace_secs = self.grace.as_secs_f64(),
            "Shutting down HTTP server"
        );
        if !self.shutdown.trigger() {
            tracing::debug!("Shutdown was already signalled");
        }

        let grace = self.grace;
        let drained = tokio::time::timeout(grace, self.drain()).await;
        let result = match drained {
            Ok(result) => result,
            Err(_) => {
                if let Some(server) = self.server.take() {
                    server.abort();
                }
                tracing::error!(
                    in_flight = self.tracker.in_flight(),
                    "Shutdown grace period expired"
                );
                Err(LifecycleError::GraceExpired(grace))
            }
        };

        self.state.transition(ServiceState::Stopped);
        result
    }

    async fn drain(&mut self) -> Result<(), LifecycleError> {
        if let Some(server) = self.server.as_mut() {
            let result = server.await;
            self.server = None;
            server_error(result).map_err(|e| match e {
                LifecycleError::Serve(io) => LifecycleError::Shutdown(io),
                other => other,
            })?;
        }
        self.tracker.wait_idle().await;
        Ok(())
    }
}

fn server_error(result: ServerResult) -> Result<(), LifecycleError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(LifecycleError::Serve(e)),
        Err(_) => Err(LifecycleError::ServerPanicked),
    }
}
