//! Ordered, case-insensitive, multi-valued header collection.
//!
//! # Design Decisions
//! - Names are trimmed and lowercased on every entry point, so lookups
//!   agree regardless of the case used when the header was set
//! - Entries keep the position of the first occurrence of a name;
//!   later values for the same name are appended to that entry
//! - Iteration fans out one `(name, value)` pair per stored value

/// Ordered header collection keyed by lowercased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, Vec<String>)>,
}

fn sanitize_name(name: &str) -> String {
    name.trim_matches(|c: char| c.is_ascii_whitespace()).to_ascii_lowercase()
}

impl HeaderMap {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = sanitize_name(name);
        self.entries.iter().position(|(n, _)| *n == name)
    }

    /// Returns true if at least one value is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|i| self.entries[i].1.first())
            .map(String::as_str)
    }

    /// All values stored under `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(i) => &self.entries[i].1,
            None => &[],
        }
    }

    /// Replace every value of `name` with a single value.
    ///
    /// An existing entry keeps its position.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        match self.position(name) {
            Some(i) => self.entries[i].1 = vec![value.into()],
            None => self.entries.push((sanitize_name(name), vec![value.into()])),
        }
        self
    }

    /// Append a value to `name`.
    pub fn add(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        match self.position(name) {
            Some(i) => self.entries[i].1.push(value.into()),
            None => self.entries.push((sanitize_name(name), vec![value.into()])),
        }
        self
    }

    /// Remove every value of `name`.
    pub fn delete(&mut self, name: &str) -> &mut Self {
        if let Some(i) = self.position(name) {
            self.entries.remove(i);
        }
        self
    }

    /// Number of `(name, value)` pairs.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, values)| values.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, value)` pairs, one per stored value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = HeaderMap::new();
        for (name, value) in iter {
            headers.add(name.as_ref(), value);
        }
        headers
    }
}
