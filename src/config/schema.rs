//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! `DiagConfig::default()` is the production configuration.

use std::time::Duration;

use crate::scan::{ScanBuffer, ScanSettings, DEFAULT_SCAN_CAPACITY, MAX_SCAN_TOKEN_SIZE};

/// Root configuration for the diagnostic service.
#[derive(Debug, Clone, Default)]
pub struct DiagConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Bounded body scanner settings.
    pub scan: ScanConfig,

    /// Server-wide timeouts.
    pub timeouts: TimeoutConfig,

    /// Startup and shutdown settings.
    pub lifecycle: LifecycleConfig,

    /// Profiling surface settings.
    pub profiling: ProfilingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8094").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8094".to_string(),
        }
    }
}

/// Settings for the `/log/` body scanner.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Time allowed from handler entry to the end of the body, in milliseconds.
    pub timeout_ms: u64,

    /// Initial capacity of each request's scan buffer.
    pub buffer_capacity: usize,

    /// Largest accepted line, excluding its terminator.
    pub max_token_size: usize,
}

impl ScanConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn buffer(&self) -> ScanBuffer {
        ScanBuffer::new(self.buffer_capacity, self.max_token_size)
    }

    /// Per-request scanner settings derived from this section.
    pub fn settings(&self) -> ScanSettings {
        ScanSettings {
            buffer: self.buffer(),
            timeout: self.timeout(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 1,
            buffer_capacity: DEFAULT_SCAN_CAPACITY,
            max_token_size: MAX_SCAN_TOKEN_SIZE,
        }
    }
}

/// Timeout configuration for the HTTP layer.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Upper bound on graceful shutdown, in seconds.
    pub shutdown_grace_secs: u64,
}

impl LifecycleConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 10,
        }
    }
}

/// Profiling surface configuration.
#[derive(Debug, Clone)]
pub struct ProfilingConfig {
    /// Mount the `/debug/pprof/` routes.
    pub enabled: bool,

    /// Profile duration used when `seconds` is not given.
    pub default_profile_secs: u64,

    /// Longest profile a client may request.
    pub max_profile_secs: u64,

    /// Interval between runtime samples.
    pub sample_interval_ms: u64,
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_profile_secs: 5,
            max_profile_secs: 8,
            sample_interval_ms: 100,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
