//! Incremental line tokenizer over a stream of body chunks.
//!
//! # Responsibilities
//! - Pull body chunks on demand, one token at a time
//! - Split on `\n`, dropping one trailing `\r`
//! - Enforce the max token size as soon as a pending line outgrows it

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};

use crate::scan::buffer::ScanBuffer;

/// Boxed transport error produced by a body stream.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error terminating a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A line grew past the configured maximum.
    #[error("token exceeds maximum size of {max} bytes")]
    TokenTooLong { max: usize },

    /// The body stream failed.
    #[error("failed to read body: {0}")]
    Read(#[source] BoxError),
}

/// Counters for a finished scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub tokens: usize,
    pub bytes: usize,
}

/// Reads line tokens from a chunked body.
///
/// `next_token` only awaits on the underlying stream, so dropping its future
/// mid-read loses no data.
pub struct LineScanner<S> {
    body: S,
    buf: BytesMut,
    max_token_size: usize,
    /// Prefix of `buf` already known to contain no newline.
    searched: usize,
    eof: bool,
    stats: ScanStats,
}

impl<S, E> LineScanner<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<BoxError>,
{
    pub fn new(body: S, buffer: ScanBuffer) -> Self {
        Self {
            body,
            buf: buffer.allocate(),
            max_token_size: buffer.max_token_size(),
            searched: 0,
            eof: false,
            stats: ScanStats::default(),
        }
    }

    /// Return the next line, or `None` once the body is exhausted.
    pub async fn next_token(&mut self) -> Result<Option<Bytes>, ScanError> {
        loop {
            if let Some(offset) = self.buf[self.searched..].iter().position(|&b| b == b'\n') {
                let mut line = self.buf.split_to(self.searched + offset + 1);
                line.truncate(line.len() - 1);
                self.searched = 0;
                return self.emit(line);
            }
            self.searched = self.buf.len();

            if self.pending_len() > self.max_token_size {
                return Err(self.too_long());
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                let line = self.buf.split();
                self.searched = 0;
                return self.emit(line);
            }

            match self.body.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(ScanError::Read(e.into())),
                None => self.eof = true,
            }
        }
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Length of the unterminated line, not counting a `\r` that may turn
    /// out to be half of a CRLF.
    fn pending_len(&self) -> usize {
        match self.buf.last() {
            Some(b'\r') => self.buf.len() - 1,
            _ => self.buf.len(),
        }
    }

    fn emit(&mut self, mut line: BytesMut) -> Result<Option<Bytes>, ScanError> {
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        if line.len() > self.max_token_size {
            return Err(self.too_long());
        }
        self.stats.tokens += 1;
        self.stats.bytes += line.len();
        Ok(Some(line.freeze()))
    }

    fn too_long(&self) -> ScanError {
        ScanError::TokenTooLong {
            max: self.max_token_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::io;

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = Result<Bytes, io::Error>> + Unpin {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(p.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    async fn collect(parts: &[&'static str], max: usize) -> Result<Vec<Bytes>, ScanError> {
        let mut scanner = LineScanner::new(chunks(parts), ScanBuffer::new(4, max));
        let mut tokens = Vec::new();
        while let Some(token) = scanner.next_token().await? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    #[tokio::test]
    async fn empty_body_has_no_tokens() {
        let tokens = collect(&[], 16).await.unwrap();
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn lines_span_chunk_boundaries() {
        let tokens = collect(&["ab", "c\nd", "e\n", "f"], 16).await.unwrap();
        assert_eq!(tokens, vec!["abc", "de", "f"]);
    }

    #[tokio::test]
    async fn crlf_and_blank_lines() {
        let tokens = collect(&["a\r\n\r\nb\r", "\n"], 16).await.unwrap();
        assert_eq!(tokens, vec!["a", "", "b"]);
    }

    #[tokio::test]
    async fn token_at_limit_is_accepted() {
        let tokens = collect(&["12345678\n", "12345678"], 8).await.unwrap();
        assert_eq!(tokens, vec!["12345678", "12345678"]);

        let tokens = collect(&["1234", "5678\r", "\n"], 8).await.unwrap();
        assert_eq!(tokens, vec!["12345678"]);
    }

    #[tokio::test]
    async fn token_over_limit_fails() {
        let err = collect(&["123456789\n"], 8).await.unwrap_err();
        assert!(matches!(err, ScanError::TokenTooLong { max: 8 }));

        let err = collect(&["123456789"], 8).await.unwrap_err();
        assert!(matches!(err, ScanError::TokenTooLong { max: 8 }));
    }

    #[tokio::test]
    async fn oversized_line_fails_before_newline_arrives() {
        let body = stream::iter(vec![Ok::<_, io::Error>(Bytes::from_static(b"0123456789"))])
            .chain(stream::pending());
        let mut scanner = LineScanner::new(body, ScanBuffer::new(4, 8));
        let err = scanner.next_token().await.unwrap_err();
        assert!(matches!(err, ScanError::TokenTooLong { .. }));
    }

    #[tokio::test]
    async fn stream_errors_surface_as_read_errors() {
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"a\n")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ]);
        let mut scanner = LineScanner::new(body, ScanBuffer::new(4, 8));
        assert_eq!(scanner.next_token().await.unwrap().unwrap(), "a");
        assert!(matches!(scanner.next_token().await, Err(ScanError::Read(_))));
    }

    #[tokio::test]
    async fn stats_count_tokens_and_bytes() {
        let mut scanner = LineScanner::new(chunks(&["a\nbb\r\nccc"]), ScanBuffer::new(4, 8));
        while scanner.next_token().await.unwrap().is_some() {}
        assert_eq!(scanner.stats(), ScanStats { tokens: 3, bytes: 6 });
    }
}
