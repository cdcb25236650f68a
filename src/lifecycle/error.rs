//! Fatal lifecycle errors.

use std::time::Duration;

use crate::config::ValidationError;
use crate::net::ListenerError;

/// Errors that end the process.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("invalid configuration: {}", join(.0))]
    InvalidConfig(Vec<ValidationError>),

    #[error("listener start failed: {0}")]
    ListenerStart(#[from] ListenerError),

    #[error("server stopped unexpectedly")]
    ServerExited,

    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error("server task panicked")]
    ServerPanicked,

    #[error("failed to listen for interrupt: {0}")]
    Signal(#[source] std::io::Error),

    #[error("shutdown failed: {0}")]
    Shutdown(#[source] std::io::Error),

    #[error("shutdown did not finish within {0:?}")]
    GraceExpired(Duration),

    #[error("forced exit on repeated interrupt")]
    ForcedExit,
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
