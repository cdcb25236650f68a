//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, trace span)
//!     → context.rs (per-request cancellation, handler task)
//!     → log.rs (bounded body scan) | profiling routes
//!     → response.rs (outcome → status + text body)
//!     → Send to client
//! ```

pub mod context;
pub mod log;
pub mod request;
pub mod response;
pub mod server;

pub use context::{CancelHandle, CancelReason, RequestContext};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
