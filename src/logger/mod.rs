//! Logger initialisation
//!
//! Installs a `tracing-subscriber` registry with:
//! - An `EnvFilter` built from the configured level
//! - Console output with color control
//! - File output in one of three formats (Full, Compact, JSON)
//!
//! The crate itself only emits `tracing` events; calling [`init_logger`]
//! is optional for applications that already install a subscriber.

pub mod config;
pub mod error;
pub(crate) mod writer;

pub use config::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing_subscriber::{
    Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the global subscriber with the given configuration
///
/// # Errors
///
/// Returns an error when the configuration is invalid, the log file cannot
/// be opened, or a global subscriber is already installed.
pub fn init_logger(config: LoggerConfig) -> Result<(), LoggerError> {
    config.validate()?;

    let filter = config.filter()?;
    let layers = build_layers(&config)?;

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| LoggerError::AlreadyInitialized {
            message: e.to_string(),
        })
}

fn build_layers(config: &LoggerConfig) -> Result<Vec<BoxedLayer>, LoggerError> {
    let mut layers = Vec::with_capacity(2);

    // The file layer goes first so span fields formatted for the console
    // never carry ANSI codes into the file (tokio-rs/tracing#1817).
    if config.file.enabled {
        layers.push(file_layer(config)?);
    }

    if config.console.enabled {
        let use_ansi = config.console.colored && std::io::stdout().is_terminal();
        layers.push(
            fmt::layer()
                .with_ansi(use_ansi)
                .with_target(true)
                .with_level(true)
                .boxed(),
        );
    }

    Ok(layers)
}

fn file_layer(config: &LoggerConfig) -> Result<BoxedLayer, LoggerError> {
    let writer = writer::open_file_writer(&config.file)?;

    let layer = match config.file.format {
        LogFormat::Full => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .compact()
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_ansi(false)
            .json()
            .with_writer(writer)
            .boxed(),
    };

    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn file_only(path: &Path, format: LogFormat, level: &str) -> LoggerConfig {
        LoggerConfig::new(
            ConsoleConfig::new(false, false),
            FileConfig::new(true, path.to_path_buf(), true, format),
            level,
        )
        .unwrap()
    }

    fn log_with(config: &LoggerConfig, emit: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry()
            .with(build_layers(config).unwrap())
            .with(config.filter().unwrap());
        tracing::subscriber::with_default(subscriber, emit);
    }

    #[test]
    fn test_json_file_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs/pushwoosh.json");
        let config = file_only(&path, LogFormat::Json, "info");

        log_with(&config, || {
            tracing::info!(count = 2, "Pushwoosh messages created");
            tracing::debug!("filtered out");
        });

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "INFO");
        assert_eq!(lines[0]["fields"]["message"], "Pushwoosh messages created");
        assert_eq!(lines[0]["fields"]["count"], 2);
    }

    #[test]
    fn test_full_file_output_has_no_ansi() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pushwoosh.log");
        let config = file_only(&path, LogFormat::Full, "debug");

        log_with(&config, || tracing::warn!(application = "APP", "retrying"));

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("WARN"));
        assert!(contents.contains("retrying"));
        assert!(contents.contains("application=\"APP\""));
        assert!(!contents.contains('\u{1b}'));
    }

    #[test]
    fn test_console_only_builds_single_layer() {
        let config = LoggerConfig::default();
        assert_eq!(build_layers(&config).unwrap().len(), 1);
    }

    #[test]
    fn test_init_rejects_invalid_config() {
        let mut config = LoggerConfig::default();
        config.console.enabled = false;
        assert!(matches!(
            init_logger(config),
            Err(LoggerError::Config { .. })
        ));
    }

    #[test]
    fn test_second_init_is_an_error() {
        let config = LoggerConfig::new(ConsoleConfig::new(true, false), FileConfig::default(), "warn")
            .unwrap();

        init_logger(config.clone()).unwrap();
        assert!(matches!(
            init_logger(config),
            Err(LoggerError::AlreadyInitialized { .. })
        ));
    }
}
