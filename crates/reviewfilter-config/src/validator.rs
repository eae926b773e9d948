//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// First error as a [`ConfigError`], if any.
    pub fn into_result(self) -> Result<(), ConfigError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(ConfigError::InvalidValue {
                field: e.path,
                message: e.message,
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        let endpoint = &config.browser.endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            result.errors.push(ValidationError::new(
                "browser.endpoint",
                "endpoint must start with http:// or https://",
            ));
        }

        if config.browser.request_timeout_secs == 0 {
            result.errors.push(ValidationError::new(
                "browser.request_timeout_secs",
                "request_timeout_secs must be greater than 0",
            ));
        }

        // Bare levels only; full directives belong in RUST_LOG.
        if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
            result.errors.push(ValidationError::new(
                "logging.level",
                format!("unknown level '{}', valid values: {:?}", config.logging.level, LOG_LEVELS),
            ));
        }

        result
    }
}
