/*!
 * Logging and tracing initialization
 */

use std::fs::File;
use std::path::Path;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;
use crate::error::{ConnectorError, ConnectorResult};

/// Build the filter: `RUST_LOG` wins, otherwise `statelink=<level>`
fn env_filter(config: &LoggingConfig) -> ConnectorResult<EnvFilter> {
    let level = config.level.to_tracing_level();
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("statelink={}", level)))
        .map_err(|e| ConnectorError::Config(format!("Failed to create log filter: {}", e)))
}

/// Initialize structured logging based on configuration.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> ConnectorResult<()> {
    let env_filter = env_filter(config)?;

    match config.file {
        Some(ref log_path) => init_file_logging(log_path, env_filter),
        None if config.json => init_stdout_json_logging(env_filter),
        None => init_stdout_logging(env_filter),
    }
}

fn already_set(e: impl std::fmt::Display) -> ConnectorError {
    ConnectorError::Config(format!("Failed to install subscriber: {}", e))
}

/// Initialize logging to stdout
fn init_stdout_logging(env_filter: EnvFilter) -> ConnectorResult<()> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(already_set)
}

/// Initialize JSON lines logging to stdout
fn init_stdout_json_logging(env_filter: EnvFilter) -> ConnectorResult<()> {
    let fmt_layer = fmt::layer().with_target(true).json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(already_set)
}

/// Initialize logging to a file, always as JSON lines
fn init_file_logging(log_path: &Path, env_filter: EnvFilter) -> ConnectorResult<()> {
    let file = File::create(log_path)
        .map_err(|e| ConnectorError::Config(format!("Failed to create log file: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_writer(file)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(already_set)
}

/// Initialize logging with custom format for testing
#[cfg(test)]
pub fn init_test_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("statelink=debug"));

        let fmt_layer = fmt::layer().with_test_writer().with_target(false).compact();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .ok(); // Ignore error if already initialized
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_env_filter_from_level() {
        let config = LoggingConfig {
            level: LogLevel::Trace,
            ..Default::default()
        };
        assert!(env_filter(&config).is_ok());
    }

    #[test]
    fn test_second_init_is_an_error() {
        init_test_logging();

        // The test subscriber already owns the global slot
        let err = init_logging(&LoggingConfig::default()).unwrap_err();
        assert!(matches!(err, ConnectorError::Config(_)));
    }

    #[test]
    fn test_file_logging_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_path = dir.path().join("statelink.log");
        let config = LoggingConfig {
            file: Some(log_path.clone()),
            ..Default::default()
        };

        // Installing may fail if another test got there first; the file is created regardless
        let _ = init_logging(&config);
        assert!(log_path.exists());
    }
}
