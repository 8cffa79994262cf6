//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures.

use reqwest::Url;

use crate::config::error::ConfigError;
use crate::config::settings::{FileSettings, LoggerSettings, PushwooshSettings, Settings};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl PushwooshSettings {
    /// Validate Pushwoosh settings
    ///
    /// # Validation Rules
    /// - Application code and token must not be empty
    /// - Endpoint must be an absolute http(s) URL
    /// - Both timeouts must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application.trim().is_empty() {
            return Err(ConfigError::validation(
                "pushwoosh.application",
                "Application code cannot be empty.",
            ));
        }

        if self.token.trim().is_empty() {
            return Err(ConfigError::validation(
                "pushwoosh.token",
                "API token cannot be empty.",
            ));
        }

        match Url::parse(&self.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::ValidationError {
                    field: "pushwoosh.endpoint".to_string(),
                    message: format!(
                        "Unsupported URL scheme '{}'. Expected http or https.",
                        url.scheme()
                    ),
                });
            }
            Err(e) => {
                return Err(ConfigError::ValidationError {
                    field: "pushwoosh.endpoint".to_string(),
                    message: format!("Invalid endpoint URL '{}': {}", self.endpoint, e),
                });
            }
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "pushwoosh.request_timeout",
                "Request timeout must be greater than 0.",
            ));
        }

        if self.connect_timeout == 0 {
            return Err(ConfigError::validation(
                "pushwoosh.connect_timeout",
                "Connect timeout must be greater than 0.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    /// - At least one output must be enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()?;

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pushwoosh.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}
