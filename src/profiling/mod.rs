//! Runtime profiling surface.
//!
//! # Routes
//! - `/debug/pprof/`: index of profiles
//! - `/debug/pprof/cmdline`: process arguments, NUL separated
//! - `/debug/pprof/symbol`: symbol lookup (unsupported, reports zero symbols)
//! - `/debug/pprof/profile`: sampled tokio runtime metrics as JSON
//! - `/debug/pprof/{name}`: named profiles (`goroutine`)
//!
//! # Design Decisions
//! - Read-only views over the runtime; nothing here touches `/log/` state
//! - Profile duration is capped below the server-wide request timeout

pub mod handlers;
pub mod sampler;

use axum::{routing::get, Router};

use crate::http::server::AppState;
use self::handlers::*;

pub use sampler::{RuntimeProfile, RuntimeSample};

/// Routes for the profiling surface.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/debug/pprof/", get(index))
        .route("/debug/pprof/cmdline", get(cmdline))
        .route("/debug/pprof/symbol", get(symbol))
        .route("/debug/pprof/profile", get(profile))
        .route("/debug/pprof/{name}", get(named_profile))
}
