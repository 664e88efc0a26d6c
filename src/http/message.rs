//! Generic HTTP message model shared by requests and responses.

use super::headers::HeaderMap;

/// One HTTP message with its head line kept as three raw parts.
///
/// For a request the parts are `(method, target, version)`, for a
/// response `(version, status code, reason)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpMessage {
    pub head_line0: String,
    pub head_line1: String,
    pub head_line2: String,
    pub headers: HeaderMap,
    /// Body with transfer framing removed (content-encoding untouched).
    pub body: Vec<u8>,
    /// Trailer block of a chunked body; empty otherwise.
    pub trailing_headers: HeaderMap,
}

impl HttpMessage {
    /// Returns true if the headers declare chunked transfer framing.
    pub fn is_chunked(&self) -> bool {
        self.headers.get("transfer-encoding") == Some("chunked")
    }
}
