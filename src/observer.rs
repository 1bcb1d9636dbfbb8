//! Status-capturing wrapper around a response sink.
//!
//! Hosts that write responses imperatively (status first, then body chunks)
//! hand the downstream handler a [`ResponseObserver`] instead of the raw sink.
//! The observer forwards every call unchanged and remembers the status that
//! actually went out, so a handler running before the rest of the pipeline
//! can see the final status of a response it did not produce.

use axum::body::Body;
use axum::http::{Response, StatusCode};
use std::io;

/// Destination of a response written piece by piece.
pub trait ResponseSink {
    /// Sets the response status line.
    fn set_status(&mut self, status: StatusCode);

    /// Writes a chunk of the response body.
    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize>;
}

impl<S: ResponseSink + ?Sized> ResponseSink for &mut S {
    fn set_status(&mut self, status: StatusCode) {
        (**self).set_status(status)
    }

    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write_body(buf)
    }
}

/// A status sent once is final; 1xx responses other than
/// `101 Switching Protocols` are interim and do not commit.
fn commits(status: StatusCode) -> bool {
    !status.is_informational() || status == StatusCode::SWITCHING_PROTOCOLS
}

/// Pass-through sink wrapper recording the committed status.
#[derive(Debug)]
pub struct ResponseObserver<S> {
    inner: S,
    status: Option<StatusCode>,
}

impl<S: ResponseSink> ResponseObserver<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            status: None,
        }
    }

    /// Status committed to the client, `None` if nothing was written yet.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ResponseSink> ResponseSink for ResponseObserver<S> {
    /// Forwards `status`. The first final status is recorded; later calls
    /// are forwarded but cannot change what was already sent.
    fn set_status(&mut self, status: StatusCode) {
        if self.status.is_none() && commits(status) {
            self.status = Some(status);
        }
        self.inner.set_status(status);
    }

    /// Records an implicit `200 OK` if no status was sent, then forwards
    /// `buf` unchanged.
    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.inner.write_body(buf)
    }
}

/// In-memory sink following the same single-status-line rule as a network
/// transport: the first final status wins, and writing the body commits an
/// implicit `200 OK`.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    status: Option<StatusCode>,
    body: Vec<u8>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts the buffer into an HTTP response, `200 OK` if no status was
    /// ever set.
    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        response
    }
}

impl ResponseSink for ResponseBuffer {
    fn set_status(&mut self, status: StatusCode) {
        if self.status.is_none() && commits(status) {
            self.status = Some(status);
        }
    }

    fn write_body(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}
