//! Script Graph Resolver: every script a page can run, and the minimum
//! ECMAScript edition it needs.
//!
//! # Data Flow
//! ```text
//! SessionArchive + access URL + observed script URLs
//!     → main document exchange (status, content type)
//!     → html.rs (scripts, handlers, <base>, import map)
//!     → resolver.rs work queue
//!          external ─▶ archive lookup ─┐
//!          inline ─────────────────────┼─▶ syntax::analyze ─▶ ScriptSyntax
//!          event handler ──────────────┘        │
//!          module imports (import_map.rs) ◀─────┘
//!     → observed URLs not seen statically, queued as dynamic
//!     → PageSyntax (script.rs)
//! ```
//!
//! # Design Decisions
//! - Pending work is an explicit enum consumed by one dispatch function;
//!   the analyzed-URL set lives in the resolver state, not in closures
//! - Structural failures are errors; unreachable secondary resources are
//!   dropped and listed in `PageSyntax::errors`

pub mod data_url;
pub mod html;
pub mod import_map;
pub mod resolver;
pub mod script;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::syntax::ScriptParseError;

pub use import_map::ImportMap;
pub use resolver::{resolve_page_syntax, ScriptGraphResolver};
pub use script::{content_hash, ModuleFacet, PageSyntax, ScriptOrigin, ScriptSyntax};

/// Failures that invalidate the whole page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("main document {url} answered with status {status}")]
    DocumentStatus { url: String, status: u16 },

    #[error("main document {url} is not HTML (content-type {content_type:?})")]
    NotHtml { url: String, content_type: String },

    /// A script whose module-ness is certain failed to parse.
    #[error("script {script} failed to parse: {source}")]
    Parse {
        script: String,
        #[source]
        source: ScriptParseError,
    },
}
