//! Diagnostic HTTP service library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod profiling;
pub mod scan;

pub use config::DiagConfig;
pub use http::HttpServer;
pub use lifecycle::{LifecycleError, RunningService, ServiceState, Shutdown};
pub use scan::{scan_body, ScanOutcome};
