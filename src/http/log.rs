//! `/log/` endpoint.

use axum::{
    body::Body,
    extract::{Extension, State},
};

use crate::http::context::RequestContext;
use crate::http::server::AppState;
use crate::scan::{scan_body, ScanOutcome};

/// Scan the request body within the configured time bound.
///
/// The body stream is owned by the scan and released on every exit path.
pub async fn log_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    body: Body,
) -> ScanOutcome {
    let outcome = scan_body(body.into_data_stream(), ctx, state.scan).await;
    tracing::debug!(outcome = outcome.label(), status = %outcome.status(), "Scan finished");

    match &outcome {
        ScanOutcome::Success(stats) => {
            tracing::debug!(tokens = stats.tokens, bytes = stats.bytes, "Body scanned");
        }
        ScanOutcome::Timeout => {
            tracing::warn!(
                timeout_ms = state.scan.timeout.as_millis() as u64,
                "Body scan timed out"
            );
        }
        ScanOutcome::Cancelled(reason) => {
            tracing::warn!(reason = %reason, "Body scan cancelled");
        }
        ScanOutcome::ReadFailure(e) => {
            tracing::error!(error = %e, "Read from body failed");
        }
    }

    outcome
}
