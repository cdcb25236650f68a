//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! DiagConfig::default() (or a test-built tree)
//!     → validation.rs (semantic checks)
//!     → DiagConfig (validated, immutable)
//!     → handed by value to the lifecycle controller and HTTP server
//! ```
//!
//! # Design Decisions
//! - No config file: the service always binds its fixed loopback address
//! - All sections have defaults; tests override single fields
//! - Validation reports every violated rule, not just the first

pub mod schema;
pub mod validation;

pub use schema::{
    DiagConfig, LifecycleConfig, ListenerConfig, ObservabilityConfig, ProfilingConfig, ScanConfig,
    TimeoutConfig,
};
pub use validation::{validate_config, ValidationError, MAX_REQUEST_SECS};
