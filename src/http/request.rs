//! HTTP request view over a generic message.
//!
//! # Responsibilities
//! - Name the head-line parts of a request (method, target, version)
//! - Parse and rebuild captured request bytes
//!
//! # Design Decisions
//! - Head-line parts are kept verbatim so a rebuild reproduces the
//!   captured bytes; comparisons on `method` are case-insensitive

use super::build::build_message;
use super::headers::HeaderMap;
use super::message::HttpMessage;
use super::parse::parse_message;
use super::HttpError;

/// A captured HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub target: String,
    pub protocol_version: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub trailing_headers: HeaderMap,
}

impl HttpRequest {
    /// Parse raw request bytes.
    pub fn parse(input: &[u8]) -> Result<Self, HttpError> {
        let message = parse_message(input)?;
        if message.head_line2.is_empty() {
            return Err(HttpError::MalformedHeadLine(format!(
                "{} {}",
                message.head_line0, message.head_line1
            )));
        }
        Ok(message.into())
    }

    /// Serialize back to raw bytes.
    pub fn build(&self) -> Vec<u8> {
        build_message(&HttpMessage::from(self.clone()))
    }

    /// Returns true if the method matches, ignoring case.
    pub fn is_method(&self, method: &str) -> bool {
        self.method.eq_ignore_ascii_case(method)
    }
}

impl From<HttpMessage> for HttpRequest {
    fn from(message: HttpMessage) -> Self {
        Self {
            method: message.head_line0,
            target: message.head_line1,
            protocol_version: message.head_line2,
            headers: message.headers,
            body: message.body,
            trailing_headers: message.trailing_headers,
        }
    }
}

impl From<HttpRequest> for HttpMessage {
    fn from(request: HttpRequest) -> Self {
        Self {
            head_line0: request.method,
            head_line1: request.target,
            head_line2: request.protocol_version,
            headers: request.headers,
            body: request.body,
            trailing_headers: request.trailing_headers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let raw = b"POST /submit HTTP/1.1\r\nHost: a.test\r\nContent-Length: 3\r\n\r\nx=1";
        let request = HttpRequest::parse(raw).unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.target, "/submit");
        assert_eq!(request.protocol_version, "HTTP/1.1");
        assert_eq!(request.body, b"x=1");
        assert!(request.is_method("post"));
        assert_eq!(request.build(), raw.to_vec());
    }

    #[test]
    fn test_request_requires_version() {
        assert!(HttpRequest::parse(b"GET /\r\n\r\n").is_err());
    }
}
