//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::archive::DEFAULT_MAX_REDIRECTS;
use crate::page::html::DEFAULT_EVENT_HANDLER_ATTRIBUTES;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct CompatConfig {
    /// Script graph resolution settings.
    pub resolver: ResolverConfig,

    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Script graph resolution settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Retry script lookups missing over `http` as `https`.
    pub upgrade_insecure_scripts: bool,

    /// Same, for the main document.
    pub upgrade_main_document: bool,

    /// Redirect hops followed per lookup.
    pub max_redirects: usize,

    /// Inline event handler attributes to analyze. `None` uses the
    /// built-in list.
    pub event_handler_attributes: Option<Vec<String>>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            upgrade_insecure_scripts: true,
            upgrade_main_document: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            event_handler_attributes: None,
        }
    }
}

impl ResolverConfig {
    /// Configured attribute list, or the built-in one.
    pub fn event_handler_attributes(&self) -> Vec<String> {
        match &self.event_handler_attributes {
            Some(attributes) => attributes.iter().map(|a| a.to_ascii_lowercase()).collect(),
            None => DEFAULT_EVENT_HANDLER_ATTRIBUTES
                .iter()
                .map(|a| a.to_string())
                .collect(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is unset.
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: CompatConfig = toml::from_str("").unwrap();
        assert_eq!(config, CompatConfig::default());
        assert!(config.resolver.upgrade_insecure_scripts);
        assert!(!config.resolver.upgrade_main_document);
        assert_eq!(config.resolver.max_redirects, 20);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_section() {
        let config: CompatConfig = toml::from_str(
            r#"
            [resolver]
            upgrade_insecure_scripts = false
            event_handler_attributes = ["onClick", "onload"]
            "#,
        )
        .unwrap();
        assert!(!config.resolver.upgrade_insecure_scripts);
        assert_eq!(config.resolver.max_redirects, 20);
        assert_eq!(config.resolver.event_handler_attributes(), vec!["onclick", "onload"]);
    }

    #[test]
    fn test_builtin_handler_list() {
        let attributes = ResolverConfig::default().event_handler_attributes();
        assert!(attributes.iter().any(|a| a == "onclick"));
        assert!(attributes.iter().all(|a| a.starts_with("on")));
    }
}
