//! Import map resolution for module specifiers.
//!
//! # Responsibilities
//! - Parse an inline import map against the document base URL
//! - Resolve a specifier from a given referrer through `scopes`, then
//!   `imports`, then plain URL resolution
//!
//! # Design Decisions
//! - Keys that look like URLs (`/`, `./`, `../`, or absolute) are
//!   normalized to absolute URLs at parse time, so lookups compare
//!   strings only
//! - Entries whose target does not parse are dropped with a warning
//! - Prefix entries (keys ending in `/`) are tried longest first

use indexmap::IndexMap;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Default, Deserialize)]
struct RawImportMap {
    #[serde(default)]
    imports: IndexMap<String, String>,
    #[serde(default)]
    scopes: IndexMap<String, IndexMap<String, String>>,
}

/// Normalized specifier → URL table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SpecifierMap {
    /// Sorted by key length, longest first.
    entries: Vec<(String, Url)>,
}

impl SpecifierMap {
    fn parse(raw: IndexMap<String, String>, base: &Url) -> Self {
        let mut entries: Vec<(String, Url)> = raw
            .into_iter()
            .filter_map(|(key, target)| {
                let key = match parse_url_like(&key, base) {
                    Some(url) => url.to_string(),
                    None if key.is_empty() => return None,
                    None => key,
                };
                let Some(target) = parse_url_like(&target, base) else {
                    tracing::warn!(%key, %target, "import map entry has an invalid target");
                    return None;
                };
                if key.ends_with('/') && !target.as_str().ends_with('/') {
                    tracing::warn!(%key, %target, "import map prefix entry must map to a prefix");
                    return None;
                }
                Some((key, target))
            })
            .collect();
        entries.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
        Self { entries }
    }

    fn resolve(&self, normalized: &str) -> Option<Url> {
        if let Some((_, target)) = self.entries.iter().find(|(key, _)| key == normalized) {
            return Some(target.clone());
        }
        self.entries.iter().find_map(|(key, target)| {
            let rest = normalized.strip_prefix(key.as_str()).filter(|_| key.ends_with('/'))?;
            target.join(rest).ok()
        })
    }
}

/// Resolve `specifier` as a URL if it is URL-like; bare specifiers yield
/// `None`.
fn parse_url_like(specifier: &str, base: &Url) -> Option<Url> {
    if specifier.starts_with('/') || specifier.starts_with("./") || specifier.starts_with("../") {
        base.join(specifier).ok()
    } else {
        Url::parse(specifier).ok()
    }
}

/// A parsed import map. The default value maps nothing and only performs
/// plain URL resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMap {
    imports: SpecifierMap,
    /// Scope prefix → map, longest prefix first.
    scopes: Vec<(String, SpecifierMap)>,
}

impl ImportMap {
    /// Parse import map JSON, resolving keys and targets against `base`.
    pub fn parse(json: &str, base: &Url) -> Result<Self, serde_json::Error> {
        let raw: RawImportMap = serde_json::from_str(json)?;

        let mut scopes: Vec<(String, SpecifierMap)> = raw
            .scopes
            .into_iter()
            .filter_map(|(prefix, map)| {
                let Ok(prefix) = base.join(&prefix) else {
                    tracing::warn!(scope = %prefix, "import map scope is not a valid URL");
                    return None;
                };
                Some((prefix.to_string(), SpecifierMap::parse(map, base)))
            })
            .collect();
        scopes.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));

        Ok(Self {
            imports: SpecifierMap::parse(raw.imports, base),
            scopes,
        })
    }

    /// Resolve `specifier` imported from the module at `referrer`.
    ///
    /// Returns `None` for a bare specifier that no entry maps.
    pub fn resolve(&self, specifier: &str, referrer: &Url) -> Option<Url> {
        let as_url = parse_url_like(specifier, referrer);
        let normalized = as_url.as_ref().map_or(specifier, Url::as_str);

        let referrer = referrer.as_str();
        let scoped = self
            .scopes
            .iter()
            .filter(|(prefix, _)| prefix == referrer || (prefix.ends_with('/') && referrer.starts_with(prefix.as_str())))
            .find_map(|(_, map)| map.resolve(normalized));

        scoped.or_else(|| self.imports.resolve(normalized)).or(as_url)
    }
}
