//! Diagnostic HTTP service (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                DIAG SERVICE                   │
//!   Client Request   │  ┌─────────┐   ┌──────────┐   ┌────────────┐  │
//!   ─────────────────┼─▶│   net   │──▶│   http   │──▶│  /log/     │  │
//!                    │  │listener │   │  server  │   │  scanner   │  │
//!                    │  └─────────┘   └────┬─────┘   └────────────┘  │
//!                    │                     │                         │
//!                    │                     ▼                         │
//!                    │               ┌────────────┐                  │
//!                    │               │ /debug/    │                  │
//!                    │               │ pprof/     │                  │
//!                    │               └────────────┘                  │
//!                    │  ┌─────────────────────────────────────────┐  │
//!                    │  │ lifecycle: start → run → shutdown       │  │
//!                    │  └─────────────────────────────────────────┘  │
//!                    └───────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use diag_service::config::DiagConfig;
use diag_service::lifecycle;
use diag_service::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config = DiagConfig::default();
    logging::init(&config.observability);

    tracing::info!("diag-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        scan_timeout_ms = config.scan.timeout_ms,
        max_token_size = config.scan.max_token_size,
        "Configuration loaded"
    );

    match lifecycle::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}
