//! Response writing.
//!
//! The host transport provides a [`ResponseSink`]. Every request wraps it in a
//! [`ResponseWriter`], which records the status line and the number of body
//! bytes that went out so the middleware chain can tell whether a response
//! has already been sent.

use std::io;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};
use tracing::warn;

/// Destination for response bytes, implemented by the host transport.
pub trait ResponseSink {
    /// Writes the status line and headers.
    fn write_head(&mut self, status: StatusCode, headers: &HeaderMap) -> io::Result<()>;

    /// Writes a chunk of body bytes, returning how many were accepted.
    fn write_body(&mut self, chunk: &[u8]) -> io::Result<usize>;

    /// Flushes buffered output.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Per-request wrapper around a [`ResponseSink`].
///
/// - The status from the first head write is kept; later attempts are
///   ignored and logged.
/// - Body writes without a prior head write send `200 OK` first.
/// - Bytes are counted across all partial writes.
///
/// # Example
///
/// ```
/// use std::io::Write;
/// use doze_core::{BufferedSink, ResponseWriter};
/// use http::StatusCode;
///
/// let mut sink = BufferedSink::new();
/// let mut writer = ResponseWriter::new(&mut sink);
/// writer.write_head(StatusCode::CREATED).unwrap();
/// writer.write_all(b"hello ").unwrap();
/// writer.write_all(b"world").unwrap();
/// writer.write_head(StatusCode::OK).unwrap();
///
/// assert_eq!(writer.status(), Some(StatusCode::CREATED));
/// assert_eq!(writer.bytes_written(), 11);
/// assert_eq!(sink.body(), b"hello world");
/// ```
pub struct ResponseWriter<'w> {
    sink: &'w mut dyn ResponseSink,
    headers: HeaderMap,
    status: Option<StatusCode>,
    bytes_written: usize,
}

impl<'w> ResponseWriter<'w> {
    /// Wraps a sink.
    pub fn new(sink: &'w mut dyn ResponseSink) -> Self {
        Self {
            sink,
            headers: HeaderMap::new(),
            status: None,
            bytes_written: 0,
        }
    }

    /// Headers that will be sent with the head.
    ///
    /// Changes made after the head has been written have no effect.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Headers staged or sent so far.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Writes the status line and staged headers.
    ///
    /// Only the first call reaches the sink.
    pub fn write_head(&mut self, status: StatusCode) -> io::Result<()> {
        if let Some(first) = self.status {
            if first != status {
                warn!(status = %first, ignored = %status, "response status already written");
            }
            return Ok(());
        }
        self.sink.write_head(status, &self.headers)?;
        self.status = Some(status);
        Ok(())
    }

    /// The status that was written, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Total body bytes written.
    #[must_use]
    pub const fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Returns true once a head or any body byte has been written.
    #[must_use]
    pub const fn is_written(&self) -> bool {
        self.status.is_some() || self.bytes_written > 0
    }
}

impl io::Write for ResponseWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.write_head(StatusCode::OK)?;
        }
        let written = self.sink.write_body(buf)?;
        self.bytes_written += written;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl std::fmt::Debug for ResponseWriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseWriter")
            .field("status", &self.status)
            .field("bytes_written", &self.bytes_written)
            .finish_non_exhaustive()
    }
}

/// An in-memory sink, used by tests and by buffering host adapters.
#[derive(Debug, Default, Clone)]
pub struct BufferedSink {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl BufferedSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The status written, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// The headers written with the head.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The body bytes written so far.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns true if nothing at all has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.body.is_empty()
    }

    /// Converts the captured output into an [`http::Response`].
    ///
    /// A sink that never saw a head yields `200 OK`.
    #[must_use]
    pub fn into_response(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(self.body.freeze());
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseSink for BufferedSink {
    fn write_head(&mut self, status: StatusCode, headers: &HeaderMap) -> io::Result<()> {
        self.status = Some(status);
        self.headers = headers.clone();
        Ok(())
    }

    fn write_body(&mut self, chunk: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(chunk);
        Ok(chunk.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;
    use http::HeaderValue;
    use std::io::Write;

    struct BrokenSink;

    impl ResponseSink for BrokenSink {
        fn write_head(&mut self, _: StatusCode, _: &HeaderMap) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn write_body(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_first_status_wins() {
        let mut sink = BufferedSink::new();
        let mut writer = ResponseWriter::new(&mut sink);
        writer.write_head(StatusCode::NOT_FOUND).unwrap();
        writer.write_head(StatusCode::OK).unwrap();
        assert_eq!(writer.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(sink.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_body_write_implies_ok() {
        let mut sink = BufferedSink::new();
        let mut writer = ResponseWriter::new(&mut sink);
        assert!(!writer.is_written());
        writer.write_all(b"abc").unwrap();
        assert!(writer.is_written());
        assert_eq!(writer.status(), Some(StatusCode::OK));
        assert_eq!(writer.bytes_written(), 3);
    }

    #[test]
    fn test_head_only_counts_as_written() {
        let mut sink = BufferedSink::new();
        let mut writer = ResponseWriter::new(&mut sink);
        writer.write_head(StatusCode::NO_CONTENT).unwrap();
        assert!(writer.is_written());
        assert_eq!(writer.bytes_written(), 0);
    }

    #[test]
    fn test_staged_headers_are_sent() {
        let mut sink = BufferedSink::new();
        let mut writer = ResponseWriter::new(&mut sink);
        writer
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        writer.write_all(b"x").unwrap();

        let response = sink.into_response();
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(response.body().as_ref(), b"x");
    }

    #[test]
    fn test_failed_head_is_not_marked_written() {
        let mut sink = BrokenSink;
        let mut writer = ResponseWriter::new(&mut sink);
        assert!(writer.write_head(StatusCode::OK).is_err());
        assert!(!writer.is_written());
        assert!(writer.write_all(b"x").is_err());
        assert_eq!(writer.bytes_written(), 0);
    }

    #[test]
    fn test_empty_sink_into_response() {
        let sink = BufferedSink::new();
        assert!(sink.is_empty());
        let response = sink.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
    }

    proptest::proptest! {
        #[test]
        fn test_bytes_written_matches_body(chunks in proptest::collection::vec(proptest::collection::vec(proptest::num::u8::ANY, 0..32), 0..8)) {
            let mut sink = BufferedSink::new();
            let total: usize = chunks.iter().map(Vec::len).sum();
            {
                let mut writer = ResponseWriter::new(&mut sink);
                for chunk in &chunks {
                    writer.write_all(chunk).unwrap();
                }
                proptest::prop_assert_eq!(writer.bytes_written(), total);
                proptest::prop_assert_eq!(writer.is_written(), total > 0);
            }
            proptest::prop_assert_eq!(sink.body().len(), total);
        }
    }
}
