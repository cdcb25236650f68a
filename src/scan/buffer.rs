//! Scan buffer sizing.

use bytes::BytesMut;

/// Largest line accepted by the scanner (1 MiB).
pub const MAX_SCAN_TOKEN_SIZE: usize = 1024 * 1024;

/// Initial capacity of each request's scan buffer (100 KiB).
pub const DEFAULT_SCAN_CAPACITY: usize = 100 * 1024;

/// Sizing parameters for one request's scanning state.
///
/// This is a plain value handed to every invocation. Each scanner allocates
/// its own buffer from it, so concurrent requests never share token state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanBuffer {
    initial_capacity: usize,
    max_token_size: usize,
}

impl ScanBuffer {
    pub const fn new(initial_capacity: usize, max_token_size: usize) -> Self {
        Self {
            initial_capacity,
            max_token_size,
        }
    }

    pub fn max_token_size(&self) -> usize {
        self.max_token_size
    }

    /// Allocate a fresh buffer for a single scan.
    ///
    /// The hint is capped at the max token size; the buffer still grows past
    /// the hint as needed, up to one chunk beyond the limit.
    pub fn allocate(&self) -> BytesMut {
        BytesMut::with_capacity(self.initial_capacity.min(self.max_token_size))
    }
}

impl Default for ScanBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_CAPACITY, MAX_SCAN_TOKEN_SIZE)
    }
}
