//! Request abstraction consumed by the receiver.
//!
//! The receiver never depends on a concrete HTTP stack. Anything that can
//! look up a header by name and hand over the complete body implements
//! [`WebhookRequest`]. Adapters are provided for:
//!
//! - [`RawRequest`] - header map and in-memory body, handy for framework glue
//!   and tests
//! - [`ReaderRequest`] - a seekable body stream, buffered on first read and
//!   rewound afterwards
//! - `hyper::Request<Bytes>` - requests already collected by a hyper based
//!   server such as axum

use bytes::Bytes;
use hyper::header::HeaderMap;
use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom};

/// Header naming the event type of a delivery.
pub const EVENT_HEADER: &str = "X-GitHub-Event";

/// Header carrying the unique delivery id.
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";

/// Inbound webhook request as seen by the receiver.
///
/// # Examples
///
/// ```rust
/// use issue_hook_core::{RawRequest, WebhookRequest};
///
/// let mut request = RawRequest::new(r#"{"action":"opened"}"#)
///     .with_header("X-GitHub-Event", "issues");
///
/// assert_eq!(request.header("x-github-event"), Some("issues"));
/// assert_eq!(&request.read_body().unwrap()[..], br#"{"action":"opened"}"#);
/// ```
pub trait WebhookRequest {
    /// Look up a header value by name.
    ///
    /// Returns `None` when the header is absent or its value is not valid
    /// UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    /// Read the complete raw body.
    ///
    /// Must return the same bytes when called more than once for the same
    /// request.
    fn read_body(&mut self) -> io::Result<Bytes>;

    /// Restore the body for consumers running after the receiver.
    ///
    /// Called once the receiver has buffered the body. The default does
    /// nothing, which suits transports that keep the body in memory.
    fn rewind_body(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Header Storage
// ============================================================================

/// Case-insensitive header storage shared by the provided adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    values: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a header value.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.values
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(|value| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<&HeaderMap> for Headers {
    /// Copy headers out of an `http` header map.
    ///
    /// Values that are not valid UTF-8 are skipped. For repeated headers the
    /// first value wins.
    fn from(map: &HeaderMap) -> Self {
        let mut headers = Headers::new();
        for name in map.keys() {
            if let Some(value) = map.get(name).and_then(|v| v.to_str().ok()) {
                headers.insert(name.as_str(), value);
            }
        }
        headers
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

// ============================================================================
// Raw Request
// ============================================================================

/// Request with headers and a fully buffered body.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    headers: Headers,
    body: Bytes,
}

impl RawRequest {
    /// Create a request with the given body and no headers.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Build a request from the parts an HTTP framework extracts.
    pub fn from_header_map(headers: &HeaderMap, body: Bytes) -> Self {
        Self {
            headers: Headers::from(headers),
            body,
        }
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl WebhookRequest for RawRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    fn read_body(&mut self) -> io::Result<Bytes> {
        Ok(self.body.clone())
    }
}

impl WebhookRequest for hyper::Request<Bytes> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|value| value.to_str().ok())
    }

    fn read_body(&mut self) -> io::Result<Bytes> {
        Ok(self.body().clone())
    }
}

// ============================================================================
// Reader Request
// ============================================================================

/// Request whose body is a seekable stream, such as a spooled temp file.
///
/// The stream is read once from the start and buffered. Later reads are
/// served from the buffer; [`rewind_body`](WebhookRequest::rewind_body)
/// seeks the stream back to the start for whoever consumes it next.
#[derive(Debug)]
pub struct ReaderRequest<R> {
    headers: Headers,
    reader: R,
    buffered: Option<Bytes>,
}

impl<R: Read + Seek> ReaderRequest<R> {
    pub fn new(headers: Headers, reader: R) -> Self {
        Self {
            headers,
            reader,
            buffered: None,
        }
    }

    /// Hand back the underlying stream.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> WebhookRequest for ReaderRequest<R> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    fn read_body(&mut self) -> io::Result<Bytes> {
        if let Some(body) = &self.buffered {
            return Ok(body.clone());
        }

        self.reader.seek(SeekFrom::Start(0))?;
        let mut buffer = Vec::new();
        self.reader.read_to_end(&mut buffer)?;

        let body = Bytes::from(buffer);
        self.buffered = Some(body.clone());
        Ok(body)
    }

    fn rewind_body(&mut self) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(0)).map(|_| ())
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
