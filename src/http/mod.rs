//! HTTP message codec for captured traffic.
//!
//! # Data Flow
//! ```text
//! archived bytes
//!     → parse.rs (head line, headers, chunked framing)
//!     → request.rs / response.rs (typed views, status validation)
//!     → encoding.rs (content-encoding decode)
//!     → body bytes for analysis
//!
//! edited body
//!     → encoding.rs (re-encode under the original content-encoding)
//!     → build.rs (head line, headers, re-chunking)
//!     → archived bytes
//! ```
//!
//! # Design Decisions
//! - Only what captured traffic needs: no pipelining, no HTTP/2 framing
//! - Bytes outside ASCII in head lines and headers survive untouched
//! - Every structural violation is a hard error (corrupt archive)

pub mod build;
pub mod encoding;
pub mod headers;
pub mod message;
pub mod parse;
pub(crate) mod reader;
pub mod request;
pub mod response;

use thiserror::Error;

pub use encoding::ContentEncoding;
pub use headers::HeaderMap;
pub use message::HttpMessage;
pub use request::HttpRequest;
pub use response::HttpResponse;

/// Errors raised while parsing or encoding HTTP messages.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A line was not terminated by CRLF.
    #[error("missing CRLF line terminator")]
    MissingLineTerminator,

    /// Fewer bytes remained than the framing declared.
    #[error("truncated message: wanted {wanted} bytes, {remaining} remaining")]
    Truncated { wanted: usize, remaining: usize },

    #[error("malformed head line: {0:?}")]
    MalformedHeadLine(String),

    #[error("malformed header line: {0:?}")]
    MalformedHeader(String),

    /// Both `transfer-encoding` and `content-length` were declared.
    #[error("transfer-encoding and content-length are both present")]
    ConflictingFraming,

    #[error("unsupported transfer-encoding: {0}")]
    UnsupportedTransferEncoding(String),

    #[error("invalid chunk size line: {0:?}")]
    InvalidChunkSize(String),

    #[error("chunk data not followed by CRLF")]
    MissingChunkTerminator,

    #[error("unexpected bytes after chunked trailer")]
    TrailingGarbage,

    #[error("invalid status code: {0:?}")]
    InvalidStatusCode(String),

    #[error("unsupported content-encoding: {0}")]
    UnsupportedContentEncoding(String),

    /// Compression or decompression failed.
    #[error("{encoding} codec failed: {source}")]
    Codec {
        encoding: ContentEncoding,
        #[source]
        source: std::io::Error,
    },
}
