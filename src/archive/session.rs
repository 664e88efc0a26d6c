//! Session archive: ordered exchanges plus passthrough metadata.
//!
//! # Responsibilities
//! - Resolve a URL to its exchange, following redirects and optionally
//!   upgrading `http` to `https`
//! - Produce edited archives without touching the original
//! - Load and save the gzip JSON archive file
//!
//! # Design Decisions
//! - Repeated captures of the same URL are kept in order, never merged;
//!   resolution picks the first
//! - Edits copy the exchange list (pointer copies) and allocate only the
//!   edited exchange; every other `Arc` is shared with the source archive
//! - Saving goes through a temporary file in the target directory and an
//!   atomic rename

use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use url::Url;

use super::exchange::{ArchivedExchange, ArchivedRequest, ArchivedResponse};
use super::format::{ArchiveFile, RequestRecord, RequestsByHost, SessionMetadata};
use super::ArchiveError;

/// Redirect hops followed before resolution gives up.
pub const DEFAULT_MAX_REDIRECTS: usize = 20;

/// How [`SessionArchive::resolve_with`] looks a URL up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Retry an unmatched `http` URL as `https`.
    pub allow_upgrade: bool,
    pub max_redirects: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            allow_upgrade: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// Position of the exchange in the archive.
    pub index: usize,
    /// Final URL after redirects and upgrades, fragment removed.
    pub url: Url,
    pub exchange: &'a Arc<ArchivedExchange>,
}

/// A recorded browser session. Cheap to clone; logically immutable.
#[derive(Debug, Clone, Default)]
pub struct SessionArchive {
    exchanges: Vec<Arc<ArchivedExchange>>,
    metadata: Arc<SessionMetadata>,
}

fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

impl SessionArchive {
    pub fn new(exchanges: Vec<ArchivedExchange>, metadata: SessionMetadata) -> Self {
        Self {
            exchanges: exchanges.into_iter().map(Arc::new).collect(),
            metadata: Arc::new(metadata),
        }
    }

    pub fn exchanges(&self) -> &[Arc<ArchivedExchange>] {
        &self.exchanges
    }

    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    fn position(&self, url: &Url) -> Option<usize> {
        self.exchanges
            .iter()
            .position(|exchange| exchange.url().as_str() == url.as_str())
    }

    /// Resolve with default options and the given upgrade policy.
    pub fn resolve(&self, url: &Url, allow_upgrade: bool) -> Result<Resolution<'_>, ArchiveError> {
        self.resolve_with(
            url,
            ResolveOptions {
                allow_upgrade,
                ..ResolveOptions::default()
            },
        )
    }

    /// Find the exchange serving `url`.
    ///
    /// Redirect responses (300–399) are followed through their `Location`
    /// header, resolved against the current URL. A redirect without
    /// `Location` is a corrupt capture and always fails, as does exceeding
    /// `max_redirects`. `allow_upgrade` applies to the requested URL only,
    /// never to a redirect target.
    pub fn resolve_with(
        &self,
        url: &Url,
        options: ResolveOptions,
    ) -> Result<Resolution<'_>, ArchiveError> {
        let mut current = without_fragment(url);
        let mut hops = 0;

        loop {
            let Some(index) = self.position(&current) else {
                if options.allow_upgrade
                    && hops == 0
                    && current.scheme() == "http"
                    && current.set_scheme("https").is_ok()
                {
                    tracing::debug!(url = %current, "retrying lookup over https");
                    continue;
                }
                return Err(ArchiveError::NotFound {
                    url: current.to_string(),
                });
            };

            let exchange = &self.exchanges[index];
            let response = exchange.response();
            if !(300..=399).contains(&response.status_code()?) {
                return Ok(Resolution {
                    index,
                    url: current,
                    exchange,
                });
            }

            let location = response
                .headers()?
                .get("location")
                .ok_or_else(|| ArchiveError::MissingLocation {
                    url: current.to_string(),
                })?;
            let next = current
                .join(location)
                .map_err(|_| ArchiveError::InvalidLocation {
                    url: current.to_string(),
                    location: location.to_string(),
                })?;

            hops += 1;
            if hops > options.max_redirects {
                return Err(ArchiveError::TooManyRedirects {
                    url: url.to_string(),
                    limit: options.max_redirects,
                });
            }
            tracing::debug!(from = %current, to = %next, "following archived redirect");
            current = without_fragment(&next);
        }
    }

    /// Like [`resolve`](Self::resolve) but maps "never captured" to `None`.
    pub fn try_resolve(
        &self,
        url: &Url,
        allow_upgrade: bool,
    ) -> Result<Option<Resolution<'_>>, ArchiveError> {
        match self.resolve(url, allow_upgrade) {
            Ok(resolution) => Ok(Some(resolution)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// A new archive whose exchange at `index` carries `body`.
    ///
    /// Status and headers are preserved (apart from the content-length
    /// fixup on serialize); all other exchanges are shared.
    pub fn with_edited_response(&self, index: usize, body: Vec<u8>) -> Result<SessionArchive, ArchiveError> {
        let edited = self
            .exchanges
            .get(index)
            .ok_or(ArchiveError::NoSuchExchange(index))?
            .with_body(body)?;

        let mut exchanges = self.exchanges.clone();
        exchanges[index] = Arc::new(edited);

        Ok(Self {
            exchanges,
            metadata: Arc::clone(&self.metadata),
        })
    }

    /// Resolve `url` (no upgrade) and edit the exchange it lands on.
    pub fn with_edited_url(&self, url: &Url, body: Vec<u8>) -> Result<SessionArchive, ArchiveError> {
        let index = self.resolve(url, false)?.index;
        self.with_edited_response(index, body)
    }

    /// Decode a gzip-compressed archive file body.
    pub fn from_compressed(bytes: &[u8]) -> Result<Self, ArchiveError> {
        let mut json = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut json)?;
        let file: ArchiveFile = serde_json::from_slice(&json)?;

        let mut exchanges = Vec::new();
        for (host, by_url) in file.requests {
            for (url_key, records) in by_url {
                for record in records {
                    let request = ArchivedRequest::from_record(
                        record.serialized_request,
                        host.clone(),
                        url_key.clone(),
                        record.last_served_session_id,
                    )?;
                    exchanges.push(ArchivedExchange::new(
                        Arc::new(request),
                        ArchivedResponse::original(record.serialized_response),
                    ));
                }
            }
        }

        tracing::debug!(exchanges = exchanges.len(), "archive decoded");
        Ok(Self::new(exchanges, file.metadata))
    }

    /// Encode to the gzip-compressed archive file body.
    pub fn to_compressed(&self) -> Result<Vec<u8>, ArchiveError> {
        let mut requests = RequestsByHost::new();
        for exchange in &self.exchanges {
            let request = exchange.request();
            requests
                .entry(request.host().to_string())
                .or_default()
                .entry(request.url_key().to_string())
                .or_default()
                .push(RequestRecord {
                    serialized_request: request.serialize().to_string(),
                    serialized_response: exchange.response().serialize()?,
                    last_served_session_id: request.last_served_session_id(),
                });
        }

        let file = ArchiveFile {
            requests,
            metadata: SessionMetadata::clone(&self.metadata),
        };
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        serde_json::to_writer(&mut encoder, &file)?;
        Ok(encoder.finish()?)
    }

    /// Read an archive file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let archive = Self::from_compressed(&fs::read(path)?)?;
        tracing::info!(path = %path.display(), exchanges = archive.len(), "archive loaded");
        Ok(archive)
    }

    /// Write an archive file atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArchiveError> {
        let path = path.as_ref();
        let bytes = self.to_compressed()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| ArchiveError::Io(e.error))?;

        tracing::info!(path = %path.display(), exchanges = self.len(), "archive saved");
        Ok(())
    }
}
