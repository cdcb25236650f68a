//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig
//!     → listener.rs (parse, bind)
//!     → axum::serve accept loop (background task)
//!     → connection.rs (in-flight handler tracking)
//! ```

pub mod connection;
pub mod listener;

pub use connection::{InFlightGuard, InFlightTracker};
pub use listener::ListenerError;
