//! Web-page-replay archive codec and ECMAScript compatibility analyzer.
//!
//! # Architecture Overview
//!
//! ```text
//!     archive file (gzip JSON)
//!            │
//!            ▼
//!     ┌─────────────┐    ┌─────────────┐
//!     │   archive   │───▶│    http     │  raw request/response bytes,
//!     │  sessions,  │    │ parse/build │  content-encoding
//!     │  resolution │    └─────────────┘
//!     └──────┬──────┘
//!            │ main document + scripts
//!            ▼
//!     ┌─────────────┐    ┌─────────────┐
//!     │    page     │───▶│   syntax    │  parse, collect evidence,
//!     │ html scan,  │    │ rule table, │  minimum ES version
//!     │ import maps │    │  collector  │
//!     └──────┬──────┘    └─────────────┘
//!            │
//!            ▼
//!      PageSyntax (JSON)
//!
//!     cross-cutting: config (TOML), observability (tracing)
//! ```

// Archive codec
pub mod archive;
pub mod http;

// Compatibility analysis
pub mod page;
pub mod syntax;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use archive::{ArchiveError, SessionArchive};
pub use config::CompatConfig;
pub use page::{resolve_page_syntax, PageError, PageSyntax, ScriptGraphResolver};
pub use syntax::{EsVersion, SyntaxReport};
