//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (redirect limit > 0)
//! - Check names (log levels, event handler attributes)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CompatConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::CompatConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("resolver.max_redirects must be greater than 0")]
    ZeroRedirectLimit,

    #[error("logging.level {0:?} is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("resolver.event_handler_attributes entry {0:?} is not an on* attribute")]
    InvalidEventHandlerAttribute(String),
}

/// Check `config`, collecting every violation.
pub fn validate_config(config: &CompatConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.resolver.max_redirects == 0 {
        errors.push(ValidationError::ZeroRedirectLimit);
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.logging.level.clone()));
    }

    if let Some(attributes) = &config.resolver.event_handler_attributes {
        for attribute in attributes {
            let lower = attribute.to_ascii_lowercase();
            if lower.len() <= 2 || !lower.starts_with("on") || !lower.bytes().all(|b| b.is_ascii_alphanumeric()) {
                errors.push(ValidationError::InvalidEventHandlerAttribute(attribute.clone()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&CompatConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_violation() {
        let mut config = CompatConfig::default();
        config.resolver.max_redirects = 0;
        config.logging.level = "verbose".to_string();
        config.resolver.event_handler_attributes = Some(vec![
            "onclick".to_string(),
            "href".to_string(),
            "on".to_string(),
        ]);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroRedirectLimit,
                ValidationError::UnknownLogLevel("verbose".to_string()),
                ValidationError::InvalidEventHandlerAttribute("href".to_string()),
                ValidationError::InvalidEventHandlerAttribute("on".to_string()),
            ]
        );
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        let mut config = CompatConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
