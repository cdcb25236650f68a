use std::fmt::Write as _;
use std::time::Duration;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tokio::runtime::Handle;

use crate::http::context::RequestContext;
use crate::http::server::AppState;
use crate::profiling::sampler;

/// Profiles listed on the index page.
const PROFILES: &[(&str, &str)] = &[
    ("cmdline", "The command line invocation of the current process"),
    ("goroutine", "Summary of live runtime tasks"),
    ("profile", "Tokio runtime samples; pass ?seconds=N for the window"),
    ("symbol", "Symbol lookup (not supported)"),
];

#[derive(Debug, Deserialize)]
pub struct ProfileParams {
    pub seconds: Option<u64>,
}

pub async fn index(State(state): State<AppState>) -> String {
    let mut page = String::from("/debug/pprof/\n\nprofiles:\n");
    for (name, description) in PROFILES {
        let _ = writeln!(page, "  {name:<10} {description}");
    }
    let _ = writeln!(page);
    let _ = writeln!(page, "uptime_secs: {}", state.started_at.elapsed().as_secs());
    let _ = writeln!(page, "in_flight_requests: {}", state.tracker.in_flight());
    page
}

pub async fn cmdline() -> String {
    std::env::args().collect::<Vec<_>>().join("\0")
}

pub async fn symbol() -> &'static str {
    "num_symbols: 0\n"
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<ProfileParams>,
) -> Response {
    let config = &state.profiling;
    let seconds = params
        .seconds
        .unwrap_or(config.default_profile_secs)
        .min(config.max_profile_secs);
    let interval = Duration::from_millis(config.sample_interval_ms);

    tracing::info!(seconds, "Runtime profile requested");
    match sampler::profile(&state.tracker, ctx, seconds, interval).await {
        Ok(profile) => Json(profile).into_response(),
        Err(reason) => {
            tracing::info!(reason = %reason, "Runtime profile abandoned");
            (StatusCode::BAD_REQUEST, reason.to_string()).into_response()
        }
    }
}

pub async fn named_profile(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match name.as_str() {
        "goroutine" => {
            let metrics = Handle::current().metrics();
            format!(
                "tasks: {}\nworkers: {}\nin_flight_requests: {}\n",
                metrics.num_alive_tasks(),
                metrics.num_workers(),
                state.tracker.in_flight(),
            )
            .into_response()
        }
        _ => (StatusCode::NOT_FOUND, format!("Unknown profile: {name}")).into_response(),
    }
}
