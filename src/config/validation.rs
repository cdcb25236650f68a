//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DiagConfig → Result<(), Vec<ValidationError>>
//! - Runs before the listener is bound

use std::net::SocketAddr;

use crate::config::schema::DiagConfig;

/// Longest server-wide request timeout accepted (one day).
pub const MAX_REQUEST_SECS: u64 = 86_400;

/// A single violated configuration rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("scan.timeout_ms must be greater than zero")]
    ZeroScanTimeout,

    #[error("scan.max_token_size must be greater than zero")]
    ZeroMaxTokenSize,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("timeouts.request_secs ({secs}) must not exceed {max}")]
    RequestTimeoutTooLarge { secs: u64, max: u64 },

    #[error("scan.timeout_ms ({scan_ms}) must be below timeouts.request_secs ({request_secs}s)")]
    ScanOutlivesRequest { scan_ms: u64, request_secs: u64 },

    #[error("profiling.sample_interval_ms must be greater than zero")]
    ZeroSampleInterval,

    #[error("profiling.max_profile_secs ({profile}) must be below timeouts.request_secs ({request})")]
    ProfileOutlivesRequest { profile: u64, request: u64 },

    #[error("profiling.max_profile_secs ({profile}) must be below lifecycle.shutdown_grace_secs ({grace})")]
    ProfileOutlivesGrace { profile: u64, grace: u64 },
}

/// Check the constraints the config types cannot express on their own.
pub fn validate_config(config: &DiagConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.scan.timeout_ms == 0 {
        errors.push(ValidationError::ZeroScanTimeout);
    }
    if config.scan.max_token_size == 0 {
        errors.push(ValidationError::ZeroMaxTokenSize);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    } else if config.timeouts.request_secs > MAX_REQUEST_SECS {
        errors.push(ValidationError::RequestTimeoutTooLarge {
            secs: config.timeouts.request_secs,
            max: MAX_REQUEST_SECS,
        });
    }
    // The outer timeout layer must not pre-empt the scanner's own answer.
    if config.scan.timeout_ms > 0
        && config.scan.timeout_ms >= config.timeouts.request_secs.saturating_mul(1000)
    {
        errors.push(ValidationError::ScanOutlivesRequest {
            scan_ms: config.scan.timeout_ms,
            request_secs: config.timeouts.request_secs,
        });
    }
    if config.profiling.enabled {
        if config.profiling.sample_interval_ms == 0 {
            errors.push(ValidationError::ZeroSampleInterval);
        }
        if config.profiling.max_profile_secs >= config.timeouts.request_secs {
            errors.push(ValidationError::ProfileOutlivesRequest {
                profile: config.profiling.max_profile_secs,
                request: config.timeouts.request_secs,
            });
        }
        // A running profile holds shutdown until it completes.
        if config.profiling.max_profile_secs >= config.lifecycle.shutdown_grace_secs {
            errors.push(ValidationError::ProfileOutlivesGrace {
                profile: config.profiling.max_profile_secs,
                grace: config.lifecycle.shutdown_grace_secs,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
