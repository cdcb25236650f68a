//! Tokio runtime sampling.

use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::time::{self, Instant};

use crate::http::context::{CancelReason, RequestContext};
use crate::net::InFlightTracker;

/// One snapshot of the runtime.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeSample {
    pub elapsed_ms: u64,
    pub workers: usize,
    pub alive_tasks: usize,
    pub in_flight_requests: u64,
}

/// Samples collected over one profile window.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeProfile {
    pub seconds: u64,
    pub interval_ms: u64,
    pub samples: Vec<RuntimeSample>,
}

/// Snapshot the current runtime.
pub fn sample(tracker: &InFlightTracker, started: Instant) -> RuntimeSample {
    let metrics = Handle::current().metrics();
    RuntimeSample {
        elapsed_ms: started.elapsed().as_millis() as u64,
        workers: metrics.num_workers(),
        alive_tasks: metrics.num_alive_tasks(),
        in_flight_requests: tracker.in_flight(),
    }
}

/// Sample every `interval` for `seconds`. Always takes at least one sample.
///
/// Stops early with the reason if `ctx` is cancelled.
pub async fn profile(
    tracker: &InFlightTracker,
    mut ctx: RequestContext,
    seconds: u64,
    interval: Duration,
) -> Result<RuntimeProfile, CancelReason> {
    let window = Duration::from_secs(seconds);
    let started = Instant::now();
    let mut ticker = time::interval(interval);
    let mut samples = Vec::new();

    loop {
        if let Some(reason) = ctx.reason() {
            return Err(reason);
        }
        tokio::select! {
            biased;
            reason = ctx.cancelled() => return Err(reason),
            _ = ticker.tick() => {}
        }
        samples.push(sample(tracker, started));
        if started.elapsed() >= window {
            break;
        }
    }

    Ok(RuntimeProfile {
        seconds,
        interval_ms: interval.as_millis() as u64,
        samples,
    })
}
