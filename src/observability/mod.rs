//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → per-request spans from the trace layer (method, uri, request_id)
//!
//! Consumers:
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Request ID flows through all log lines of a request
//! - Runtime introspection lives in `profiling`, not here

pub mod logging;
