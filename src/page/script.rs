//! Page and script compatibility verdicts, as persisted downstream.
//!
//! JSON shape of one script:
//!
//! ```text
//! {kind: "external" | "inline", url | hash, minimumESVersion, features,
//!  isModule, importUrls?, dynamicLoading?, isEventHandler?}
//! ```
//!
//! The Rust model keeps origin and module facets as enums; the flat
//! record exists only for (de)serialization and rejects combinations the
//! enums cannot express.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::syntax::{EsVersion, SyntaxReport};

/// Hex SHA-256 of an inline script's text, its identity in reports.
pub fn content_hash(source: &str) -> String {
    format!("{:x}", Sha256::digest(source.as_bytes()))
}

/// Where a script came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOrigin {
    External {
        url: String,
        /// Observed at runtime but not found statically.
        dynamic_loading: bool,
    },
    Inline {
        hash: String,
        event_handler: bool,
    },
}

/// Whether the script is a module, and what it imports if so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleFacet {
    NonModule,
    Module { import_urls: Vec<String> },
}

/// Verdict for one script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ScriptRecord", try_from = "ScriptRecord")]
pub struct ScriptSyntax {
    pub origin: ScriptOrigin,
    pub minimum_es_version: EsVersion,
    /// Distinct `version:name` strings.
    pub features: Vec<String>,
    pub module: ModuleFacet,
}

impl ScriptSyntax {
    pub fn new(origin: ScriptOrigin, report: &SyntaxReport, module: ModuleFacet) -> Self {
        Self {
            origin,
            minimum_es_version: report.minimum_es_version,
            features: report.features(),
            module,
        }
    }

    pub fn is_module(&self) -> bool {
        matches!(self.module, ModuleFacet::Module { .. })
    }

    /// URL of an external script.
    pub fn url(&self) -> Option<&str> {
        match &self.origin {
            ScriptOrigin::External { url, .. } => Some(url),
            ScriptOrigin::Inline { .. } => None,
        }
    }

    pub fn import_urls(&self) -> &[String] {
        match &self.module {
            ModuleFacet::Module { import_urls } => import_urls,
            ModuleFacet::NonModule => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ScriptKind {
    External,
    Inline,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptRecord {
    kind: ScriptKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
    #[serde(rename = "minimumESVersion")]
    minimum_es_version: EsVersion,
    features: Vec<String>,
    is_module: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    import_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dynamic_loading: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_event_handler: Option<bool>,
}

impl From<ScriptSyntax> for ScriptRecord {
    fn from(script: ScriptSyntax) -> Self {
        let (kind, url, hash, dynamic_loading, is_event_handler) = match script.origin {
            ScriptOrigin::External { url, dynamic_loading } => {
                (ScriptKind::External, Some(url), None, Some(dynamic_loading), None)
            }
            ScriptOrigin::Inline { hash, event_handler } => {
                (ScriptKind::Inline, None, Some(hash), None, Some(event_handler))
            }
        };
        let (is_module, import_urls) = match script.module {
            ModuleFacet::NonModule => (false, None),
            ModuleFacet::Module { import_urls } => (true, Some(import_urls)),
        };
        Self {
            kind,
            url,
            hash,
            minimum_es_version: script.minimum_es_version,
            features: script.features,
            is_module,
            import_urls,
            dynamic_loading,
            is_event_handler,
        }
    }
}

impl TryFrom<ScriptRecord> for ScriptSyntax {
    type Error = String;

    fn try_from(record: ScriptRecord) -> Result<Self, Self::Error> {
        let origin = match record.kind {
            ScriptKind::External => ScriptOrigin::External {
                url: record.url.ok_or("external script without url")?,
                dynamic_loading: record.dynamic_loading.unwrap_or(false),
            },
            ScriptKind::Inline => ScriptOrigin::Inline {
                hash: record.hash.ok_or("inline script without hash")?,
                event_handler: record.is_event_handler.unwrap_or(false),
            },
        };
        if record.is_module && matches!(origin, ScriptOrigin::Inline { event_handler: true, .. }) {
            return Err("event handlers are never modules".to_string());
        }
        let module = if record.is_module {
            ModuleFacet::Module {
                import_urls: record.import_urls.unwrap_or_default(),
            }
        } else {
            ModuleFacet::NonModule
        };
        Ok(Self {
            origin,
            minimum_es_version: record.minimum_es_version,
            features: record.features,
            module,
        })
    }
}

/// Verdict for one page: the artifact handed to transpilation and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSyntax {
    /// Base URL scripts are resolved against, fragment removed.
    pub document_url: String,
    /// Highest script minimum; ES5 for a page without scripts.
    #[serde(rename = "minimumESVersion")]
    pub minimum_es_version: EsVersion,
    pub scripts: Vec<ScriptSyntax>,
    /// Secondary resources that were dropped, one line each.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl PageSyntax {
    /// URLs of every analyzed external script, in analysis order.
    pub fn external_urls(&self) -> impl Iterator<Item = &str> + '_ {
        self.scripts.iter().filter_map(ScriptSyntax::url)
    }
}
