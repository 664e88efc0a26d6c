//! HTTP response view over a generic message.
//!
//! # Responsibilities
//! - Validate the status code (integer in 100..=599)
//! - Classify status codes (success, redirect)
//! - Decode and re-encode the body under its content-encoding
//!
//! # Design Decisions
//! - The status code is held as a number, so a rebuilt status line
//!   writes it in canonical form (`0200` comes back as `200`); the
//!   version and reason parts are kept verbatim

use super::build::build_message;
use super::encoding::ContentEncoding;
use super::headers::HeaderMap;
use super::message::HttpMessage;
use super::parse::parse_message;
use super::HttpError;

/// A captured HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub protocol_version: String,
    pub status_code: u16,
    pub status_message: String,
    pub headers: HeaderMap,
    /// Body as transferred: framing removed, content-encoding still applied.
    pub body: Vec<u8>,
    pub trailing_headers: HeaderMap,
}

impl HttpResponse {
    /// Parse raw response bytes.
    pub fn parse(input: &[u8]) -> Result<Self, HttpError> {
        Self::try_from(parse_message(input)?)
    }

    /// Serialize back to raw bytes.
    pub fn build(&self) -> Vec<u8> {
        build_message(&HttpMessage::from(self.clone()))
    }

    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// 3xx.
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status_code)
    }

    /// The declared content-encoding.
    pub fn content_encoding(&self) -> Result<ContentEncoding, HttpError> {
        ContentEncoding::from_header(self.headers.get("content-encoding"))
    }

    /// Body with its content-encoding removed.
    pub fn decoded_body(&self) -> Result<Vec<u8>, HttpError> {
        if self.body.is_empty() {
            return Ok(Vec::new());
        }
        self.content_encoding()?.decode(&self.body)
    }
}

fn parse_status_code(raw: &str) -> Result<u16, HttpError> {
    raw.parse::<u16>()
        .ok()
        .filter(|code| (100..=599).contains(code))
        .ok_or_else(|| HttpError::InvalidStatusCode(raw.to_string()))
}

impl TryFrom<HttpMessage> for HttpResponse {
    type Error = HttpError;

    fn try_from(message: HttpMessage) -> Result<Self, Self::Error> {
        let status_code = parse_status_code(&message.head_line1)?;
        Ok(Self {
            protocol_version: message.head_line0,
            status_code,
            status_message: message.head_line2,
            headers: message.headers,
            body: message.body,
            trailing_headers: message.trailing_headers,
        })
    }
}

impl From<HttpResponse> for HttpMessage {
    fn from(response: HttpResponse) -> Self {
        Self {
            head_line0: response.protocol_version,
            head_line1: response.status_code.to_string(),
            head_line2: response.status_message,
            headers: response.headers,
            body: response.body,
            trailing_headers: response.trailing_headers,
        }
    }
}
