//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, request context)
//! - Serve on a bound listener until the shutdown signal fires

use axum::{
    middleware,
    routing::any,
    Router,
};
use axum::body::Body;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::Instant;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{DiagConfig, ProfilingConfig};
use crate::http::context::attach_request_context;
use crate::http::log::log_handler;
use crate::http::request::{make_request_span, MakeRequestUuid};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::net::InFlightTracker;
use crate::profiling;
use crate::scan::ScanSettings;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub scan: ScanSettings,
    pub profiling: ProfilingConfig,
    pub tracker: InFlightTracker,
    pub started_at: Instant,
}

/// HTTP server for the diagnostic service.
pub struct HttpServer {
    router: Router,
    tracker: InFlightTracker,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &DiagConfig) -> Self {
        let tracker = InFlightTracker::new();
        let state = AppState {
            scan: config.scan.settings(),
            profiling: config.profiling.clone(),
            tracker: tracker.clone(),
            started_at: Instant::now(),
        };

        let router = Self::build_router(config, state);
        Self { router, tracker }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DiagConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/log/", any(log_handler))
            .route("/log/{*rest}", any(log_handler));
        if config.profiling.enabled {
            router = router.merge(profiling::router());
        }

        router
            .layer(middleware::from_fn_with_state(
                state.tracker.clone(),
                attach_request_context,
            ))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The assembled router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Tracker of running handlers, shared with the lifecycle controller.
    pub fn tracker(&self) -> InFlightTracker {
        self.tracker.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires or its controller is dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
