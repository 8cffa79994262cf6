//! Configuration settings structures
//!
//! This module defines all configuration structures that map to TOML
//! configuration files and environment variables.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_endpoint() -> String {
    "https://cp.pushwoosh.com/json/1.3/createMessage".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/pushwoosh.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

// ============================================================================
// Pushwoosh Settings
// ============================================================================

/// Credentials and HTTP settings for the Pushwoosh createMessage endpoint
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushwooshSettings {
    /// Application code, e.g. `AAAAA-BBBBB`
    #[serde(default)]
    pub application: String,

    /// API access token
    #[serde(default)]
    pub token: String,

    /// Full URL of the createMessage method
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl Default for PushwooshSettings {
    fn default() -> Self {
        Self {
            application: String::new(),
            token: String::new(),
            endpoint: default_endpoint(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl fmt::Debug for PushwooshSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushwooshSettings")
            .field("application", &self.application)
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    /// Append to an existing file instead of truncating it
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: true,
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level or `EnvFilter` directive, e.g. `info` or `pushwoosh_rs=debug`
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert the file representation into the runtime [`LoggerConfig`]
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file = self.file.into_file_config()?;

        LoggerConfig::new(console, file, self.level)
            .map_err(|e| ConfigError::validation("logger".to_string(), e.to_string()))
    }
}

impl FileSettings {
    fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self.format.parse::<LogFormat>().map_err(|e| {
            ConfigError::validation("logger.file.format".to_string(), e.to_string())
        })?;

        Ok(FileConfig::new(
            self.enabled,
            PathBuf::from(self.path),
            self.append,
            format,
        ))
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete client settings
///
/// This structure represents the entire configuration that can be loaded
/// from TOML files and environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub pushwoosh: PushwooshSettings,

    #[serde(default)]
    pub logger: LoggerSettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_pushwoosh_settings() -> impl Strategy<Value = PushwooshSettings> {
        (
            "[A-F0-9]{5}-[A-F0-9]{5}",
            "[A-Za-z0-9]{20,40}",
            1u64..600,
            1u64..120,
        )
            .prop_map(|(application, token, request_timeout, connect_timeout)| {
                PushwooshSettings {
                    application,
                    token,
                    endpoint: default_endpoint(),
                    request_timeout,
                    connect_timeout,
                }
            })
    }

    fn arb_logger_settings() -> impl Strategy<Value = LoggerSettings> {
        (
            prop_oneof!["trace", "debug", "info", "warn", "error"],
            any::<bool>(),
            any::<bool>(),
            "[a-z]{1,10}/[a-z]{1,10}\\.log",
            prop_oneof!["full", "compact", "json"],
        )
            .prop_map(|(level, colored, append, path, format)| LoggerSettings {
                level,
                console: ConsoleSettings {
                    enabled: true,
                    colored,
                },
                file: FileSettings {
                    enabled: false,
                    path,
                    append,
                    format,
                },
            })
    }

    proptest! {
        #[test]
        fn prop_settings_toml_roundtrip(
            pushwoosh in arb_pushwoosh_settings(),
            logger in arb_logger_settings(),
        ) {
            let settings = Settings { pushwoosh, logger };
            let toml = toml::to_string(&settings).unwrap();
            let parsed: Settings = toml::from_str(&toml).unwrap();
            prop_assert_eq!(settings, parsed);
        }
    }

    #[test]
    fn test_defaults_from_empty_document() {
        let settings: Settings = serde_json::from_str("{}").unwrap();

        assert_eq!(
            settings.pushwoosh.endpoint,
            "https://cp.pushwoosh.com/json/1.3/createMessage"
        );
        assert_eq!(settings.pushwoosh.request_timeout, 30);
        assert_eq!(settings.pushwoosh.connect_timeout, 10);
        assert!(settings.pushwoosh.application.is_empty());
        assert_eq!(settings.logger, LoggerSettings::default());
    }

    #[test]
    fn test_debug_redacts_token() {
        let settings = PushwooshSettings {
            application: "AAAAA-BBBBB".to_string(),
            token: "super-secret".to_string(),
            ..Default::default()
        };

        let debug = format!("{settings:?}");
        assert!(debug.contains("AAAAA-BBBBB"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_into_logger_config() {
        let settings = LoggerSettings {
            level: "debug".to_string(),
            console: ConsoleSettings {
                enabled: true,
                colored: false,
            },
            file: FileSettings {
                enabled: true,
                path: "logs/test.log".to_string(),
                append: false,
                format: "Compact".to_string(),
            },
        };

        let config = settings.into_logger_config().unwrap();

        assert_eq!(config.level, "debug");
        assert!(!config.console.colored);
        assert!(config.file.enabled);
        assert!(!config.file.append);
        assert_eq!(config.file.format, LogFormat::Compact);
        assert_eq!(config.file.path, PathBuf::from("logs/test.log"));
    }

    #[test]
    fn test_into_logger_config_rejects_unknown_format() {
        let mut settings = LoggerSettings::default();
        settings.file.format = "xml".to_string();

        let err = settings.into_logger_config().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError { ref field, .. } if field == "logger.file.format"
        ));
    }
}
