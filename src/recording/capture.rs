//! In-memory response sink used to observe a handler's output

use http::{HeaderMap, StatusCode};

/// Sink a wrapped handler writes its response into
pub trait ResponseWriter: Send {
    /// Set the response status
    fn set_status(&mut self, status: StatusCode);

    /// Write the response body, returning the number of bytes accepted
    fn write_body(&mut self, body: &[u8]) -> usize;

    /// Headers associated with the exchange
    fn headers(&self) -> &HeaderMap;
}

/// Captures status and body without transmitting anything
///
/// The status defaults to `200 OK` once a body is written without an
/// explicit status. Only the last body write is kept.
#[derive(Debug, Default)]
pub struct CaptureWriter {
    status: Option<StatusCode>,
    body: Vec<u8>,
    headers: HeaderMap,
}

impl CaptureWriter {
    /// Create a capture exposing the original request's headers
    #[must_use]
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            status: None,
            body: Vec::new(),
            headers,
        }
    }

    /// Captured status, `200 OK` if the handler never set one
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Captured body
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consume the capture, returning status and body
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, Vec<u8>) {
        (self.status(), self.body)
    }
}

impl ResponseWriter for CaptureWriter {
    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn write_body(&mut self, body: &[u8]) -> usize {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body = body.to_vec();
        body.len()
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}
