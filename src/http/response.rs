//! Response mapping for scan outcomes.
//!
//! # Design Decisions
//! - Plain text bodies, one fixed message per outcome
//! - Cancellation echoes the caller's own reason
//! - Error responses carry `nosniff` like the reference service's errors

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::scan::ScanOutcome;

pub const READ_SUCCESSFUL: &str = "Read Successful";
pub const TIMEOUT_REACHED: &str = "Timeout Reached";
pub const READ_FAILED: &str = "Read from body failed";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

impl ScanOutcome {
    /// Status code reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            ScanOutcome::Success(_) => StatusCode::OK,
            ScanOutcome::Timeout => StatusCode::REQUEST_TIMEOUT,
            ScanOutcome::Cancelled(_) => StatusCode::BAD_REQUEST,
            ScanOutcome::ReadFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ScanOutcome {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ScanOutcome::Success(_) => READ_SUCCESSFUL.to_string(),
            ScanOutcome::Timeout => TIMEOUT_REACHED.to_string(),
            ScanOutcome::Cancelled(reason) => reason.to_string(),
            ScanOutcome::ReadFailure(_) => READ_FAILED.to_string(),
        };

        let mut response = (status, body).into_response();
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
        if !status.is_success() {
            headers.insert(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            );
        }
        response
    }
}
