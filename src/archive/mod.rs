//! Session archive: the replayable capture of one browser session.
//!
//! # Data Flow
//! ```text
//! archive file (gzip JSON)
//!     → format.rs (host → URL → ordered records, passthrough metadata)
//!     → exchange.rs (request + lazily decoded response per record)
//!     → session.rs (ordered exchanges, URL resolution, edits)
//!     → format.rs → archive file
//! ```
//!
//! # Design Decisions
//! - Archives are values: every edit returns a new archive that shares
//!   all unedited exchanges through `Arc`
//! - Raw request/response bytes stay base64-encoded until first read,
//!   and untouched exchanges are written back verbatim
//! - Passthrough metadata is validated for shape but never interpreted

pub mod exchange;
pub mod format;
pub mod session;

use thiserror::Error;

use crate::http::HttpError;

pub use exchange::{ArchivedExchange, ArchivedRequest, ArchivedResponse};
pub use format::SessionMetadata;
pub use session::{Resolution, ResolveOptions, SessionArchive, DEFAULT_MAX_REDIRECTS};

/// Errors raised while loading, resolving, or editing an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The decompressed file is not the expected JSON shape.
    #[error("malformed archive: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid base64 in archived message: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("corrupt archived message: {0}")]
    Http(#[from] HttpError),

    #[error("invalid archived URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The archive never captured this resource.
    #[error("archive has no exchange for {url}")]
    NotFound { url: String },

    #[error("redirect from {url} has no Location header")]
    MissingLocation { url: String },

    #[error("redirect from {url} has unusable Location {location:?}")]
    InvalidLocation { url: String, location: String },

    #[error("more than {limit} redirects starting at {url}")]
    TooManyRedirects { url: String, limit: usize },

    #[error("no exchange at index {0}")]
    NoSuchExchange(usize),
}

impl ArchiveError {
    /// True only for the recoverable "resource was never captured" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
