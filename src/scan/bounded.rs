//! Bounded-time body scan.
//!
//! Races three termination sources for every token: the timeout armed at
//! entry, the request's cancellation signal, and the next line from the
//! body. The order is fixed: timeout, then cancellation, then read.

use std::time::Duration;

use bytes::Bytes;
use futures_util::Stream;
use tokio::time::Instant;

use crate::http::context::{CancelReason, RequestContext};
use crate::scan::buffer::ScanBuffer;
use crate::scan::scanner::{BoxError, LineScanner, ScanError};

pub use crate::scan::scanner::ScanStats;

/// Upper bound applied to any scan timeout.
pub const MAX_SCAN_TIMEOUT: Duration = Duration::from_secs(86_400);

/// Per-request scanner settings.
#[derive(Debug, Clone, Copy)]
pub struct ScanSettings {
    pub buffer: ScanBuffer,
    pub timeout: Duration,
}

/// How a scan terminated. Exactly one per request.
#[derive(Debug)]
pub enum ScanOutcome {
    /// The body was consumed before timeout or cancellation.
    Success(ScanStats),
    /// The timeout elapsed first.
    Timeout,
    /// The request's cancellation signal fired first.
    Cancelled(CancelReason),
    /// The body could not be read or tokenized.
    ReadFailure(ScanError),
}

impl ScanOutcome {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            ScanOutcome::Success(_) => "success",
            ScanOutcome::Timeout => "timeout",
            ScanOutcome::Cancelled(_) => "cancelled",
            ScanOutcome::ReadFailure(_) => "read_failure",
        }
    }
}

enum Step {
    Timeout,
    Cancelled(CancelReason),
    Token(Result<Option<Bytes>, ScanError>),
}

/// Scan `body` line by line until it ends, the timeout fires, or `ctx` is
/// cancelled.
///
/// The timeout is armed on entry. If both the timeout and the cancellation
/// have fired by the time of a check, the result is `Timeout`.
pub async fn scan_body<S, E>(
    body: S,
    mut ctx: RequestContext,
    settings: ScanSettings,
) -> ScanOutcome
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<BoxError>,
{
    let deadline_at = Instant::now() + settings.timeout.min(MAX_SCAN_TIMEOUT);
    let deadline = tokio::time::sleep_until(deadline_at);
    tokio::pin!(deadline);

    let mut scanner = LineScanner::new(body, settings.buffer);

    loop {
        // Compare against the clock: the timer entry only reports elapsed
        // after the driver has run.
        if Instant::now() >= deadline_at {
            return ScanOutcome::Timeout;
        }
        if let Some(reason) = ctx.reason() {
            return ScanOutcome::Cancelled(reason);
        }

        let step = tokio::select! {
            biased;
            _ = &mut deadline => Step::Timeout,
            reason = ctx.cancelled() => Step::Cancelled(reason),
            token = scanner.next_token() => Step::Token(token),
        };

        match step {
            Step::Timeout => return ScanOutcome::Timeout,
            Step::Cancelled(reason) => return ScanOutcome::Cancelled(reason),
            Step::Token(Ok(Some(_))) => continue,
            Step::Token(Ok(None)) => return ScanOutcome::Success(scanner.stats()),
            Step::Token(Err(e)) => return ScanOutcome::ReadFailure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::context::CancelHandle;
    use futures_util::{stream, StreamExt};
    use std::io;

    type Chunk = Result<Bytes, io::Error>;

    fn settings(timeout: Duration) -> ScanSettings {
        ScanSettings {
            buffer: ScanBuffer::new(8, 16),
            timeout,
        }
    }

    fn body(parts: &[&'static str]) -> impl Stream<Item = Chunk> + Unpin {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(p.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    fn stalled() -> impl Stream<Item = Chunk> + Unpin {
        stream::pending()
    }

    fn context() -> (CancelHandle, RequestContext) {
        RequestContext::new()
    }

    #[tokio::test(start_paused = true)]
    async fn complete_body_succeeds() {
        let (_handle, ctx) = context();
        let outcome = scan_body(body(&["a\nb\n", "c\n"]), ctx, settings(Duration::from_millis(1))).await;
        match outcome {
            ScanOutcome::Success(stats) => assert_eq!(stats.tokens, 3),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn empty_body_succeeds_immediately() {
        let (_handle, ctx) = context();
        let outcome = scan_body(body(&[]), ctx, settings(Duration::from_millis(1))).await;
        assert!(matches!(outcome, ScanOutcome::Success(ScanStats { tokens: 0, bytes: 0 })));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_body_times_out() {
        let (_handle, ctx) = context();
        let started = tokio::time::Instant::now();
        let outcome = scan_body(stalled(), ctx, settings(Duration::from_millis(1))).await;
        assert!(matches!(outcome, ScanOutcome::Timeout));
        assert!(started.elapsed() >= Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_producer_without_newline_times_out() {
        let (_handle, ctx) = context();
        let trickle = stream::iter(vec![Ok::<_, io::Error>(Bytes::from_static(b"ab"))])
            .chain(stream::once(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(Bytes::from_static(b"c\n"))
            }))
            .boxed();
        let outcome = scan_body(trickle, ctx, settings(Duration::from_millis(1))).await;
        assert!(matches!(outcome, ScanOutcome::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_read_is_reported() {
        let (handle, ctx) = context();
        let scan = tokio::spawn(scan_body(stalled(), ctx, settings(Duration::from_secs(60))));
        tokio::task::yield_now().await;

        handle.cancel(CancelReason::Canceled);
        let outcome = scan.await.unwrap();
        assert!(matches!(outcome, ScanOutcome::Cancelled(CancelReason::Canceled)));
    }

    #[tokio::test(start_paused = true)]
    async fn already_cancelled_context_stops_before_reading() {
        let (handle, ctx) = context();
        handle.cancel(CancelReason::ClientDisconnected);
        let outcome = scan_body(body(&["a\n"]), ctx, settings(Duration::from_secs(60))).await;
        assert!(matches!(
            outcome,
            ScanOutcome::Cancelled(CancelReason::ClientDisconnected)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_wins_over_cancellation() {
        let (handle, ctx) = context();
        handle.cancel(CancelReason::Canceled);
        let outcome = scan_body(body(&["a\n"]), ctx, settings(Duration::ZERO)).await;
        assert!(matches!(outcome, ScanOutcome::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_timeout_is_capped() {
        let (_handle, ctx) = context();
        let outcome = scan_body(body(&["a\n"]), ctx, settings(Duration::MAX)).await;
        assert!(matches!(outcome, ScanOutcome::Success(ScanStats { tokens: 1, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_token_is_a_read_failure() {
        let (_handle, ctx) = context();
        let outcome = scan_body(
            body(&["0123456789abcdefX\n"]),
            ctx,
            settings(Duration::from_secs(60)),
        )
        .await;
        assert!(matches!(
            outcome,
            ScanOutcome::ReadFailure(ScanError::TokenTooLong { max: 16 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn token_at_limit_succeeds() {
        let (_handle, ctx) = context();
        let outcome = scan_body(
            body(&["0123456789abcdef\n"]),
            ctx,
            settings(Duration::from_secs(60)),
        )
        .await;
        assert!(matches!(outcome, ScanOutcome::Success(ScanStats { tokens: 1, bytes: 16 })));
    }

    #[tokio::test(start_paused = true)]
    async fn read_error_is_reported_after_cancellation_is_checked() {
        let (_handle, ctx) = context();
        let failing = stream::iter(vec![
            Ok(Bytes::from_static(b"a\n")),
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated")),
        ]);
        let outcome = scan_body(failing, ctx, settings(Duration::from_secs(60))).await;
        assert!(matches!(outcome, ScanOutcome::ReadFailure(ScanError::Read(_))));
    }
}
