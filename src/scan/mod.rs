//! Bounded body scanning subsystem.
//!
//! # Data Flow
//! ```text
//! request body (stream of Bytes chunks)
//!     → scanner.rs (line tokenization, max token size)
//!     → bounded.rs (race: timeout → cancellation → next token)
//!     → ScanOutcome (Success | Timeout | Cancelled | ReadFailure)
//!     → http/response.rs (exactly one status + body)
//! ```
//!
//! # Design Decisions
//! - Each request allocates its own buffer from a `Copy` capacity hint
//! - Timeout is checked before cancellation on every step
//! - Exceeding the max token size is a read error, never a truncation

pub mod bounded;
pub mod buffer;
pub mod scanner;

pub use bounded::{scan_body, ScanOutcome, ScanSettings, ScanStats};
pub use buffer::{ScanBuffer, DEFAULT_SCAN_CAPACITY, MAX_SCAN_TOKEN_SIZE};
pub use scanner::{LineScanner, ScanError};
