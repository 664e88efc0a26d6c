//! Archived request/response pairs.
//!
//! # Responsibilities
//! - Hold the base64 request/response bytes exactly as stored
//! - Parse each message at most once, on first access
//! - Decode the response body once under its content-encoding
//! - Produce modified responses whose bytes are rebuilt on serialize
//!
//! # Design Decisions
//! - `OnceLock` caches keep exchanges `Send + Sync` so archives can be
//!   shared across worker threads
//! - A modified response keeps the original head (status, headers) and
//!   recompresses the new body under the original content-encoding

use std::sync::{Arc, OnceLock};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use url::Url;

use super::ArchiveError;
use crate::http::{HeaderMap, HttpRequest, HttpResponse};

/// Request half of an exchange, immutable once loaded.
#[derive(Debug)]
pub struct ArchivedRequest {
    serialized: String,
    host: String,
    url_key: String,
    url: Url,
    last_served_session_id: i64,
    parsed: OnceLock<HttpRequest>,
}

impl ArchivedRequest {
    /// Build from a stored record.
    ///
    /// `host` and `url_key` are the grouping keys of the archive file and
    /// are written back unchanged.
    pub fn from_record(
        serialized: String,
        host: String,
        url_key: String,
        last_served_session_id: i64,
    ) -> Result<Self, ArchiveError> {
        let url = Url::parse(&url_key).map_err(|source| ArchiveError::InvalidUrl {
            url: url_key.clone(),
            source,
        })?;
        Ok(Self {
            serialized,
            host,
            url_key,
            url,
            last_served_session_id,
            parsed: OnceLock::new(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The URL string exactly as keyed in the archive file.
    pub fn url_key(&self) -> &str {
        &self.url_key
    }

    pub fn last_served_session_id(&self) -> i64 {
        self.last_served_session_id
    }

    /// Base64 request bytes as stored.
    pub fn serialize(&self) -> &str {
        &self.serialized
    }

    /// Parsed request, decoded on first call.
    pub fn message(&self) -> Result<&HttpRequest, ArchiveError> {
        if let Some(message) = self.parsed.get() {
            return Ok(message);
        }
        let message = HttpRequest::parse(&STANDARD.decode(&self.serialized)?)?;
        Ok(self.parsed.get_or_init(|| message))
    }

    pub fn method(&self) -> Result<&str, ArchiveError> {
        Ok(&self.message()?.method)
    }

    pub fn headers(&self) -> Result<&HeaderMap, ArchiveError> {
        Ok(&self.message()?.headers)
    }
}

/// Response as captured, parsed lazily.
#[derive(Debug)]
pub struct OriginalResponse {
    serialized: String,
    parsed: OnceLock<HttpResponse>,
    body: OnceLock<Vec<u8>>,
}

/// Response whose body was replaced.
#[derive(Debug, Clone)]
pub struct ModifiedResponse {
    /// Original head; its `body` field is left empty.
    head: Arc<HttpResponse>,
    body: Vec<u8>,
}

/// Either variant of an archived response, with one read contract.
#[derive(Debug)]
pub enum ArchivedResponse {
    Original(OriginalResponse),
    Modified(ModifiedResponse),
}

impl ArchivedResponse {
    /// Wrap base64 response bytes from an archive record.
    pub fn original(serialized: String) -> Self {
        Self::Original(OriginalResponse {
            serialized,
            parsed: OnceLock::new(),
            body: OnceLock::new(),
        })
    }

    /// The parsed message. For a modified response the body field is empty;
    /// use [`ArchivedResponse::body`] for content.
    pub fn message(&self) -> Result<&HttpResponse, ArchiveError> {
        match self {
            Self::Original(original) => {
                if let Some(message) = original.parsed.get() {
                    return Ok(message);
                }
                let message = HttpResponse::parse(&STANDARD.decode(&original.serialized)?)?;
                Ok(original.parsed.get_or_init(|| message))
            }
            Self::Modified(modified) => Ok(&modified.head),
        }
    }

    pub fn status_code(&self) -> Result<u16, ArchiveError> {
        Ok(self.message()?.status_code)
    }

    pub fn headers(&self) -> Result<&HeaderMap, ArchiveError> {
        Ok(&self.message()?.headers)
    }

    /// Body with content-encoding removed.
    pub fn body(&self) -> Result<&[u8], ArchiveError> {
        match self {
            Self::Original(original) => {
                if let Some(body) = original.body.get() {
                    return Ok(body);
                }
                let body = self.message()?.decoded_body()?;
                Ok(original.body.get_or_init(|| body))
            }
            Self::Modified(modified) => Ok(&modified.body),
        }
    }

    pub fn is_modified(&self) -> bool {
        matches!(self, Self::Modified(_))
    }

    /// A modified response carrying `body`, keeping this response's head.
    pub fn with_body(&self, body: Vec<u8>) -> Result<ArchivedResponse, ArchiveError> {
        let head = match self {
            Self::Original(_) => {
                let mut head = self.message()?.clone();
                head.body = Vec::new();
                Arc::new(head)
            }
            Self::Modified(modified) => Arc::clone(&modified.head),
        };
        Ok(Self::Modified(ModifiedResponse { head, body }))
    }

    /// Base64 response bytes for the archive file.
    ///
    /// An original response is returned verbatim. A modified one is
    /// recompressed under the original content-encoding and, when the
    /// head declared `content-length`, that header is fixed up.
    pub fn serialize(&self) -> Result<String, ArchiveError> {
        match self {
            Self::Original(original) => Ok(original.serialized.clone()),
            Self::Modified(modified) => {
                let mut response = HttpResponse::clone(&modified.head);
                response.body = response.content_encoding()?.encode(&modified.body)?;
                if response.headers.contains("content-length") {
                    let len = response.body.len().to_string();
                    response.headers.set("content-length", len);
                }
                Ok(STANDARD.encode(response.build()))
            }
        }
    }
}

/// One captured request/response pair.
#[derive(Debug)]
pub struct ArchivedExchange {
    request: Arc<ArchivedRequest>,
    response: ArchivedResponse,
}

impl ArchivedExchange {
    pub fn new(request: Arc<ArchivedRequest>, response: ArchivedResponse) -> Self {
        Self { request, response }
    }

    /// Build an exchange from raw HTTP bytes, keyed by `url`.
    pub fn from_http(
        url: &str,
        request: &[u8],
        response: &[u8],
        last_served_session_id: i64,
    ) -> Result<Self, ArchiveError> {
        let parsed = Url::parse(url).map_err(|source| ArchiveError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let host = match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };
        let request = ArchivedRequest::from_record(
            STANDARD.encode(request),
            host,
            url.to_string(),
            last_served_session_id,
        )?;
        Ok(Self::new(
            Arc::new(request),
            ArchivedResponse::original(STANDARD.encode(response)),
        ))
    }

    pub fn request(&self) -> &ArchivedRequest {
        &self.request
    }

    pub fn response(&self) -> &ArchivedResponse {
        &self.response
    }

    pub fn url(&self) -> &Url {
        self.request.url()
    }

    /// Same request, response body replaced.
    pub fn with_body(&self, body: Vec<u8>) -> Result<ArchivedExchange, ArchiveError> {
        Ok(Self {
            request: Arc::clone(&self.request),
            response: self.response.with_body(body)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ContentEncoding;

    const REQUEST: &[u8] = b"GET /app.js HTTP/1.1\r\nHost: a.test\r\n\r\n";

    fn gzip_response(body: &[u8]) -> Vec<u8> {
        let encoded = ContentEncoding::Gzip.encode(body).unwrap();
        let mut raw = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/javascript\r\nContent-Encoding: gzip\r\nContent-Length: {}\r\n\r\n",
            encoded.len()
        )
        .into_bytes();
        raw.extend_from_slice(&encoded);
        raw
    }

    #[test]
    fn test_original_reads_decoded_body() {
        let exchange =
            ArchivedExchange::from_http("https://a.test/app.js", REQUEST, &gzip_response(b"let a;"), 0).unwrap();
        let response = exchange.response();
        assert_eq!(response.status_code().unwrap(), 200);
        assert_eq!(response.body().unwrap(), b"let a;");
        assert!(!response.is_modified());
        assert_eq!(exchange.request().method().unwrap(), "GET");
        assert_eq!(exchange.request().host(), "a.test");
    }

    #[test]
    fn test_modified_recompresses_and_fixes_content_length() {
        let exchange =
            ArchivedExchange::from_http("https://a.test/app.js", REQUEST, &gzip_response(b"let a;"), 0).unwrap();
        let new_body = b"var a; /* transpiled */".to_vec();
        let edited = exchange.with_body(new_body.clone()).unwrap();
        assert!(edited.response().is_modified());
        assert_eq!(edited.response().body().unwrap(), &new_body[..]);

        let bytes = STANDARD.decode(edited.response().serialize().unwrap()).unwrap();
        let reparsed = HttpResponse::parse(&bytes).unwrap();
        assert_eq!(reparsed.headers.get("content-encoding"), Some("gzip"));
        assert_eq!(
            reparsed.headers.get("content-length"),
            Some(reparsed.body.len().to_string().as_str())
        );
        assert_eq!(reparsed.decoded_body().unwrap(), new_body);

        // the original stays untouched
        assert_eq!(exchange.response().body().unwrap(), b"let a;");
    }

    #[test]
    fn test_modified_without_content_length_does_not_add_one() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\n0\r\n\r\n";
        let exchange = ArchivedExchange::from_http("https://a.test/", REQUEST, raw, 0).unwrap();
        let edited = exchange.response().with_body(b"defg".to_vec()).unwrap();
        let bytes = STANDARD.decode(edited.serialize().unwrap()).unwrap();
        let reparsed = HttpResponse::parse(&bytes).unwrap();
        assert!(!reparsed.headers.contains("content-length"));
        assert_eq!(reparsed.body, b"defg");
    }

    #[test]
    fn test_with_body_twice_yields_latest() {
        let exchange =
            ArchivedExchange::from_http("https://a.test/app.js", REQUEST, &gzip_response(b"1"), 0).unwrap();
        let once = exchange.response().with_body(b"2".to_vec()).unwrap();
        let twice = once.with_body(b"3".to_vec()).unwrap();
        assert_eq!(twice.body().unwrap(), b"3");
        assert_eq!(twice.status_code().unwrap(), 200);
    }

    #[test]
    fn test_original_serializes_verbatim() {
        let response = ArchivedResponse::original("not even base64".to_string());
        assert_eq!(response.serialize().unwrap(), "not even base64");
        assert!(matches!(response.status_code(), Err(ArchiveError::Base64(_))));
    }
}
