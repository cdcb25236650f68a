//! Per-request cancellation context.
//!
//! # Responsibilities
//! - Create one cancellation signal per inbound request
//! - Fire it with a reason when the serving layer abandons the request
//! - Track in-flight handlers for shutdown draining
//!
//! # Design Decisions
//! - Handlers run on their own task so they observe the cancellation
//!   instead of being dropped along with the connection
//! - First reason wins; later cancels are ignored

use std::fmt;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::watch;
use tracing::Instrument;

use crate::net::connection::InFlightTracker;

/// Why a request was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The serving layer dropped the request, usually because the
    /// connection closed.
    ClientDisconnected,
    /// The owner of the request cancelled it explicitly.
    Canceled,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::ClientDisconnected => write!(f, "client disconnected"),
            CancelReason::Canceled => write!(f, "request canceled"),
        }
    }
}

/// Read side of a request's cancellation signal.
#[derive(Debug, Clone)]
pub struct RequestContext {
    rx: watch::Receiver<Option<CancelReason>>,
}

/// Write side of a request's cancellation signal, owned by the serving layer.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<Option<CancelReason>>,
}

impl RequestContext {
    /// Create a linked handle and context.
    pub fn new() -> (CancelHandle, RequestContext) {
        let (tx, rx) = watch::channel(None);
        (CancelHandle { tx }, RequestContext { rx })
    }

    /// The cancellation reason, if the signal has fired.
    pub fn reason(&self) -> Option<CancelReason> {
        *self.rx.borrow()
    }

    /// Wait until the signal fires.
    ///
    /// Never resolves if the handle is dropped without cancelling.
    pub async fn cancelled(&mut self) -> CancelReason {
        let fired = match self.rx.wait_for(Option::is_some).await {
            Ok(reason) => *reason,
            Err(_) => None,
        };
        match fired {
            Some(reason) => reason,
            None => std::future::pending().await,
        }
    }
}

impl CancelHandle {
    /// Fire the signal. Only the first reason is kept.
    pub fn cancel(&self, reason: CancelReason) {
        self.tx.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(reason);
                true
            } else {
                false
            }
        });
    }

    /// Wrap the handle so it fires `ClientDisconnected` unless disarmed.
    pub fn on_drop(self) -> DisconnectGuard {
        DisconnectGuard {
            handle: Some(self),
        }
    }
}

/// Fires the request's cancellation signal when dropped while armed.
#[derive(Debug)]
pub struct DisconnectGuard {
    handle: Option<CancelHandle>,
}

impl DisconnectGuard {
    /// The request finished normally; dropping must not cancel it.
    pub fn disarm(mut self) {
        self.handle = None;
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::debug!("Request abandoned by serving layer");
            handle.cancel(CancelReason::ClientDisconnected);
        }
    }
}

/// Middleware attaching a [`RequestContext`] to every request.
///
/// The downstream handler is spawned so that if this future is dropped
/// (connection closed, outer timeout) the handler keeps running and sees the
/// cancellation.
pub async fn attach_request_context(
    State(tracker): State<InFlightTracker>,
    mut request: Request,
    next: Next,
) -> Response {
    let (handle, ctx) = RequestContext::new();
    request.extensions_mut().insert(ctx);
    let guard = handle.on_drop();

    let in_flight = tracker.track();
    tracing::debug!(seq = %in_flight.seq(), "Request context attached");
    let handler = tokio::spawn(
        async move {
            let response = next.run(request).await;
            drop(in_flight);
            response
        }
        .instrument(tracing::Span::current()),
    );

    let result = handler.await;
    guard.disarm();

    match result {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Request handler task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_reason_wins() {
        let (handle, ctx) = RequestContext::new();
        assert_eq!(ctx.reason(), None);

        handle.cancel(CancelReason::Canceled);
        handle.cancel(CancelReason::ClientDisconnected);
        assert_eq!(ctx.reason(), Some(CancelReason::Canceled));
    }

    #[test]
    fn dropped_guard_reports_disconnect() {
        let (handle, ctx) = RequestContext::new();
        drop(handle.on_drop());
        assert_eq!(ctx.reason(), Some(CancelReason::ClientDisconnected));
    }

    #[test]
    fn disarmed_guard_does_not_cancel() {
        let (handle, ctx) = RequestContext::new();
        handle.on_drop().disarm();
        assert_eq!(ctx.reason(), None);
    }

    #[tokio::test]
    async fn cancelled_resolves_with_reason() {
        let (handle, mut ctx) = RequestContext::new();
        let waiter = tokio::spawn(async move { ctx.cancelled().await });
        tokio::task::yield_now().await;

        handle.cancel(CancelReason::Canceled);
        assert_eq!(waiter.await.unwrap(), CancelReason::Canceled);
    }

    #[tokio::test]
    async fn cancelled_pends_when_handle_dropped() {
        let (handle, mut ctx) = RequestContext::new();
        drop(handle);
        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(20), ctx.cancelled()).await;
        assert!(waited.is_err());
    }

    #[test]
    fn reasons_render_as_text() {
        assert_eq!(CancelReason::ClientDisconnected.to_string(), "client disconnected");
        assert_eq!(CancelReason::Canceled.to_string(), "request canceled");
    }

    #[tokio::test]
    async fn dropped_request_cancels_its_scan() {
        use axum::{body::Body, extract::Extension, middleware, routing::any, Router};
        use tokio::sync::mpsc;
        use tower::ServiceExt;

        use crate::scan::{scan_body, ScanBuffer, ScanOutcome, ScanSettings};

        let settings = ScanSettings {
            buffer: ScanBuffer::new(16, 64),
            timeout: std::time::Duration::from_secs(60),
        };
        let (outcomes, mut observed) = mpsc::unbounded_channel();
        let tracker = InFlightTracker::new();
        let router = Router::new()
            .route(
                "/log/",
                any(move |Extension(ctx): Extension<RequestContext>, body: Body| {
                    let outcomes = outcomes.clone();
                    async move {
                        let outcome = scan_body(body.into_data_stream(), ctx, settings).await;
                        let _ = outcomes.send(outcome);
                        StatusCode::OK
                    }
                }),
            )
            .layer(middleware::from_fn_with_state(
                tracker.clone(),
                attach_request_context,
            ));

        let stalled = futures_util::stream::pending::<Result<bytes::Bytes, std::io::Error>>();
        let request = axum::http::Request::builder()
            .uri("/log/")
            .body(Body::from_stream(stalled))
            .unwrap();
        let serving = tokio::spawn(router.oneshot(request));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(tracker.in_flight(), 1);

        serving.abort();
        let outcome = tokio::time::timeout(std::time::Duration::from_millis(500), observed.recv())
            .await
            .expect("scan did not observe the disconnect")
            .unwrap();
        assert!(
            matches!(outcome, ScanOutcome::Cancelled(CancelReason::ClientDisconnected)),
            "unexpected outcome: {outcome:?}"
        );
        tokio::time::timeout(std::time::Duration::from_millis(500), tracker.wait_idle())
            .await
            .expect("handler still tracked after cancellation");
    }
}
