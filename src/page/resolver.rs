//! Work-queue resolution of a page's script graph.
//!
//! # Responsibilities
//! - Validate and scan the main document
//! - Analyze every statically reachable script, following module imports
//! - Add scripts observed at runtime that static analysis missed
//!
//! # Design Decisions
//! - One FIFO queue of [`PendingScript`] values, drained twice: once for
//!   static discovery, once more after observed URLs are appended
//! - An external URL is analyzed at most once; both the requested URL and
//!   the URL it finally resolved to are marked
//! - Module-ness declared by markup or an import is binding, so a parse
//!   failure there fails the page; scripts of unknown kind are tried as
//!   classic, then module, then JSON, and dropped if all fail

use std::collections::{HashSet, VecDeque};
use std::fmt;

use swc_core::ecma::ast::Program;
use url::Url;

use super::data_url::decode_data_url;
use super::html::{scan_document, HtmlScript};
use super::import_map::ImportMap;
use super::script::{content_hash, ModuleFacet, PageSyntax, ScriptOrigin, ScriptSyntax};
use super::PageError;
use crate::archive::{ResolveOptions, SessionArchive};
use crate::config::ResolverConfig;
use crate::syntax::{
    analyze_program, parse_program, static_module_requests, EsVersion, ParseGoal, ScriptParseError, SyntaxReport,
};

/// A script waiting to be analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingScript {
    /// `module` is `None` when nothing declared the script's kind.
    External { url: Url, module: Option<bool>, dynamic: bool },
    Inline { source: String, module: Option<bool> },
    EventHandler { source: String },
}

/// Resolves page script graphs out of one archive.
#[derive(Debug, Clone, Copy)]
pub struct ScriptGraphResolver<'a> {
    archive: &'a SessionArchive,
    config: &'a ResolverConfig,
}

/// Resolve with the default configuration.
pub fn resolve_page_syntax(
    archive: &SessionArchive,
    access_url: &Url,
    observed: &[Url],
) -> Result<PageSyntax, PageError> {
    ScriptGraphResolver::new(archive, &ResolverConfig::default()).resolve(access_url, observed)
}

impl<'a> ScriptGraphResolver<'a> {
    pub fn new(archive: &'a SessionArchive, config: &'a ResolverConfig) -> Self {
        Self { archive, config }
    }

    fn lookup_options(&self, allow_upgrade: bool) -> ResolveOptions {
        ResolveOptions {
            allow_upgrade,
            max_redirects: self.config.max_redirects,
        }
    }

    /// Compute the [`PageSyntax`] of the page served at `access_url`.
    ///
    /// `observed` lists script URLs seen while the page ran; those not
    /// found statically are analyzed as dynamically loaded.
    pub fn resolve(&self, access_url: &Url, observed: &[Url]) -> Result<PageSyntax, PageError> {
        let (final_url, html) = self.load_document(access_url)?;
        let scan = scan_document(&html, &self.config.event_handler_attributes());
        let mut errors = Vec::new();

        let mut document_url = match scan.base_href.as_deref().map(|href| final_url.join(href)) {
            Some(Ok(base)) => base,
            Some(Err(e)) => {
                tracing::warn!(url = %final_url, error = %e, "ignoring unusable <base href>");
                errors.push(format!("<base href>: {e}"));
                final_url.clone()
            }
            None => final_url.clone(),
        };
        document_url.set_fragment(None);

        let import_map = match scan.import_map.as_deref() {
            Some(json) => ImportMap::parse(json, &document_url).unwrap_or_else(|e| {
                tracing::warn!(url = %document_url, error = %e, "ignoring malformed import map");
                errors.push(format!("import map: {e}"));
                ImportMap::default()
            }),
            None => ImportMap::default(),
        };

        let mut graph = ScriptGraph {
            archive: self.archive,
            options: self.lookup_options(self.config.upgrade_insecure_scripts),
            document_url,
            import_map,
            analyzed: HashSet::new(),
            queue: VecDeque::new(),
            scripts: Vec::new(),
            errors,
        };

        for script in scan.scripts {
            let pending = match script {
                HtmlScript::External { src, module } => match graph.document_url.join(&src) {
                    Ok(url) => PendingScript::External {
                        url,
                        module: Some(module),
                        dynamic: false,
                    },
                    Err(e) => {
                        graph.drop_script(&src, e);
                        continue;
                    }
                },
                HtmlScript::Inline { source, module } => PendingScript::Inline {
                    source,
                    module: Some(module),
                },
                HtmlScript::EventHandler { source, .. } => PendingScript::EventHandler { source },
            };
            graph.queue.push_back(pending);
        }
        graph.drain()?;

        for url in observed {
            let mut url = url.clone();
            url.set_fragment(None);
            if !graph.analyzed.contains(url.as_str()) {
                tracing::debug!(%url, "queueing dynamically loaded script");
                graph.queue.push_back(PendingScript::External {
                    url,
                    module: None,
                    dynamic: true,
                });
            }
        }
        graph.drain()?;

        Ok(graph.finish())
    }

    /// The main document's final URL and markup.
    fn load_document(&self, access_url: &Url) -> Result<(Url, String), PageError> {
        let resolution = self
            .archive
            .resolve_with(access_url, self.lookup_options(self.config.upgrade_main_document))?;
        let response = resolution.exchange.response();

        let status = response.status_code()?;
        if !(200..=299).contains(&status) {
            return Err(PageError::DocumentStatus {
                url: resolution.url.to_string(),
                status,
            });
        }

        // an absent content-type is taken as HTML
        if let Some(content_type) = response.headers()?.get("content-type") {
            if !content_type.to_ascii_lowercase().contains("html") {
                return Err(PageError::NotHtml {
                    url: resolution.url.to_string(),
                    content_type: content_type.to_string(),
                });
            }
        }

        let html = String::from_utf8_lossy(response.body()?).into_owned();
        Ok((resolution.url, html))
    }
}

/// Mutable state of one resolution.
struct ScriptGraph<'a> {
    archive: &'a SessionArchive,
    options: ResolveOptions,
    document_url: Url,
    import_map: ImportMap,
    analyzed: HashSet<String>,
    queue: VecDeque<PendingScript>,
    scripts: Vec<ScriptSyntax>,
    errors: Vec<String>,
}

/// Outcome of parsing a script of unknown kind.
enum Guess {
    Parsed(Program, bool),
    /// Not JavaScript, but valid JSON.
    Json,
}

fn guess_kind(source: &str) -> Result<Guess, ScriptParseError> {
    let classic = match parse_program(source, ParseGoal::Script) {
        Ok(program) => return Ok(Guess::Parsed(program, false)),
        Err(e) => e,
    };
    if let Ok(program) = parse_program(source, ParseGoal::Module) {
        return Ok(Guess::Parsed(program, true));
    }
    if serde_json::from_str::<serde_json::Value>(source).is_ok() {
        return Ok(Guess::Json);
    }
    Err(classic)
}

fn label(origin: &ScriptOrigin) -> String {
    match origin {
        ScriptOrigin::External { url, .. } => url.clone(),
        ScriptOrigin::Inline { hash, event_handler: false } => format!("inline script {hash}"),
        ScriptOrigin::Inline { hash, event_handler: true } => format!("event handler {hash}"),
    }
}

impl ScriptGraph<'_> {
    fn drain(&mut self) -> Result<(), PageError> {
        while let Some(pending) = self.queue.pop_front() {
            match pending {
                PendingScript::External { url, module, dynamic } => self.analyze_external(url, module, dynamic)?,
                PendingScript::Inline { source, module } => {
                    let base = self.document_url.clone();
                    self.analyze_inline(&source, module, &base)?;
                }
                PendingScript::EventHandler { source } => {
                    let origin = ScriptOrigin::Inline {
                        hash: content_hash(&source),
                        event_handler: true,
                    };
                    let program = parse_program(&source, ParseGoal::EventHandler).map_err(|source| {
                        PageError::Parse {
                            script: label(&origin),
                            source,
                        }
                    })?;
                    self.record(origin, &analyze_program(&program), ModuleFacet::NonModule);
                }
            }
        }
        Ok(())
    }

    fn drop_script(&mut self, script: &str, reason: impl fmt::Display) {
        tracing::warn!(script, %reason, "dropping script");
        self.errors.push(format!("{script}: {reason}"));
    }

    fn analyze_external(&mut self, mut url: Url, module: Option<bool>, dynamic: bool) -> Result<(), PageError> {
        url.set_fragment(None);
        if !self.analyzed.insert(url.to_string()) {
            tracing::debug!(%url, "script already analyzed");
            return Ok(());
        }

        match url.scheme() {
            "http" | "https" => {}
            "data" => {
                return match decode_data_url(&url) {
                    Ok(bytes) => {
                        let source = String::from_utf8_lossy(&bytes).into_owned();
                        let base = self.document_url.clone();
                        self.analyze_inline(&source, module, &base)
                    }
                    Err(e) => {
                        self.drop_script(url.as_str(), e);
                        Ok(())
                    }
                };
            }
            scheme => {
                tracing::debug!(%url, scheme, "skipping script that is not fetched over the network");
                return Ok(());
            }
        }

        let archive = self.archive;
        let resolution = match archive.resolve_with(&url, self.options) {
            Ok(resolution) => resolution,
            Err(e) if e.is_not_found() => {
                self.drop_script(url.as_str(), e);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        self.analyzed.insert(resolution.url.to_string());

        let response = resolution.exchange.response();
        let status = response.status_code()?;
        if !(200..=299).contains(&status) {
            self.drop_script(url.as_str(), format_args!("archived response has status {status}"));
            return Ok(());
        }

        let source = String::from_utf8_lossy(response.body()?).into_owned();
        let origin = ScriptOrigin::External {
            url: url.to_string(),
            dynamic_loading: dynamic,
        };
        self.analyze(origin, &source, module, &resolution.url)
    }

    fn analyze_inline(&mut self, source: &str, module: Option<bool>, base: &Url) -> Result<(), PageError> {
        let origin = ScriptOrigin::Inline {
            hash: content_hash(source),
            event_handler: false,
        };
        self.analyze(origin, source, module, base)
    }

    /// Parse, analyze, record, and queue imports of one script.
    fn analyze(&mut self, origin: ScriptOrigin, source: &str, module: Option<bool>, base: &Url) -> Result<(), PageError> {
        let parsed = match module {
            Some(is_module) => {
                let goal = if is_module { ParseGoal::Module } else { ParseGoal::Script };
                let program = parse_program(source, goal).map_err(|source| PageError::Parse {
                    script: label(&origin),
                    source,
                })?;
                Some((program, is_module))
            }
            None => match guess_kind(source) {
                Ok(Guess::Parsed(program, is_module)) => Some((program, is_module)),
                Ok(Guess::Json) => {
                    tracing::debug!(script = %label(&origin), "JSON payload where a script was expected");
                    None
                }
                Err(e) => {
                    self.drop_script(&label(&origin), e);
                    return Ok(());
                }
            },
        };

        match parsed {
            Some((program, true)) => {
                let report = analyze_program(&program);
                let import_urls = self.enqueue_imports(&program, base);
                self.record(origin, &report, ModuleFacet::Module { import_urls });
            }
            Some((program, false)) => {
                self.record(origin, &analyze_program(&program), ModuleFacet::NonModule);
            }
            None => self.record(origin, &SyntaxReport::default(), ModuleFacet::NonModule),
        }
        Ok(())
    }

    fn enqueue_imports(&mut self, program: &Program, base: &Url) -> Vec<String> {
        let mut import_urls = Vec::new();
        for specifier in static_module_requests(program) {
            let Some(mut url) = self.import_map.resolve(&specifier, base) else {
                self.drop_script(&specifier, format_args!("unresolvable module specifier imported by {base}"));
                continue;
            };
            url.set_fragment(None);
            import_urls.push(url.to_string());
            self.queue.push_back(PendingScript::External {
                url,
                module: Some(true),
                dynamic: false,
            });
        }
        import_urls
    }

    fn record(&mut self, origin: ScriptOrigin, report: &SyntaxReport, module: ModuleFacet) {
        tracing::debug!(
            script = %label(&origin),
            minimum = %report.minimum_es_version,
            features = ?report.features(),
            "script analyzed"
        );
        self.scripts.push(ScriptSyntax::new(origin, report, module));
    }

    fn finish(self) -> PageSyntax {
        let minimum_es_version = EsVersion::max_of(self.scripts.iter().map(|s| s.minimum_es_version));
        tracing::info!(
            document_url = %self.document_url,
            scripts = self.scripts.len(),
            dropped = self.errors.len(),
            minimum = %minimum_es_version,
            "page syntax resolved"
        );
        PageSyntax {
            document_url: self.document_url.to_string(),
            minimum_es_version,
            scripts: self.scripts,
            errors: self.errors,
        }
    }
}
