/*!
 * Configuration types for statelink
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::connector::{STATE_NAMESPACE, TRANSLATIONS_NAMESPACE};
use crate::error::{ConnectorError, ConnectorResult};

/// Environment variable overriding `server.base_url`
pub const ENV_BASE_URL: &str = "STATELINK_BASE_URL";
/// Environment variable overriding `server.timeout_secs`
pub const ENV_TIMEOUT_SECS: &str = "STATELINK_TIMEOUT_SECS";
/// Environment variable overriding `logging.level`
pub const ENV_LOG_LEVEL: &str = "STATELINK_LOG_LEVEL";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Namespace segment of the translations API
    #[serde(default = "default_translations_namespace")]
    pub translations_namespace: String,

    /// Namespace segment of the remote state API
    #[serde(default = "default_state_namespace")]
    pub state_namespace: String,

    /// Remote server and transport settings
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the remote server lives and how to reach it.
///
/// Read-only once a transport has been built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Base URL every request is joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Headers sent with every request
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,

    /// Request timeout enforced by the transport (None = no timeout)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_headers: BTreeMap::new(),
            timeout_secs: None,
        }
    }
}

impl ServerSettings {
    /// Check that the base URL is an absolute http(s) URL
    pub fn validate(&self) -> ConnectorResult<()> {
        let url = url::Url::parse(&self.base_url).map_err(|e| {
            ConnectorError::Config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConnectorError::Config(format!(
                "Unsupported URL scheme '{}' in base URL",
                other
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    /// Log file path (None = stdout)
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// JSON lines instead of the compact human format
    #[serde(default)]
    pub json: bool,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            translations_namespace: default_translations_namespace(),
            state_namespace: default_state_namespace(),
            server: ServerSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// Default value functions for serde
fn default_base_url() -> String {
    "http://localhost:8888/".to_string()
}

fn default_translations_namespace() -> String {
    TRANSLATIONS_NAMESPACE.to_string()
}

fn default_state_namespace() -> String {
    STATE_NAMESPACE.to_string()
}

impl ConnectorConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> ConnectorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConnectorError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: ConnectorConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> ConnectorResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConnectorError::Config(format!("Failed to encode config: {}", e)))?;
        std::fs::write(path, contents).map_err(|e| {
            ConnectorError::Config(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    /// Load from `path` if given (defaults otherwise), apply environment overrides and
    /// validate
    pub fn load(path: Option<&Path>) -> ConnectorResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.server.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in [`load`](Self::load))
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConnectorResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.server.base_url = base_url;
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            let secs = timeout.trim().parse::<u64>().map_err(|_| {
                ConnectorError::Config(format!(
                    "{ENV_TIMEOUT_SECS} must be whole seconds, got '{timeout}'"
                ))
            })?;
            self.server.timeout_secs = Some(secs);
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = LogLevel::parse(&level).ok_or_else(|| {
                ConnectorError::Config(format!("Unknown log level '{level}'"))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ConnectorConfig::default();
        assert_eq!(config.server.base_url, "http://localhost:8888/");
        assert_eq!(config.server.timeout_secs, None);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.server.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: ConnectorConfig = toml::from_str("").unwrap();
        assert_eq!(config.translations_namespace, TRANSLATIONS_NAMESPACE);
        assert_eq!(config.state_namespace, STATE_NAMESPACE);
    }

    #[test]
    fn test_toml_example() {
        let toml_str = r#"
state_namespace = "api/workspaces"

[server]
base_url = "https://hub.example.com/user/alice/"
timeout_secs = 30

[server.default_headers]
"X-XSRFToken" = "abc"

[logging]
level = "debug"
json = true
"#;

        let config: ConnectorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "https://hub.example.com/user/alice/");
        assert_eq!(config.server.timeout_secs, Some(30));
        assert_eq!(
            config.server.default_headers.get("X-XSRFToken").map(String::as_str),
            Some("abc")
        );
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.json);
        assert_eq!(config.state_namespace, "api/workspaces");
        assert_eq!(config.translations_namespace, TRANSLATIONS_NAMESPACE);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("statelink.toml");

        let mut config = ConnectorConfig::default();
        config.server.timeout_secs = Some(12);
        config.to_file(&path).unwrap();

        let loaded = ConnectorConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = ConnectorConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConnectorError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_BASE_URL, "http://10.0.0.5:9999"),
            (ENV_TIMEOUT_SECS, "7"),
            (ENV_LOG_LEVEL, "WARNING"),
        ]
        .into_iter()
        .collect();

        let mut config = ConnectorConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.base_url, "http://10.0.0.5:9999");
        assert_eq!(config.server.timeout_secs, Some(7));
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_bad_overrides_rejected() {
        let mut config = ConnectorConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_TIMEOUT_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConnectorError::Config(_)));

        let err = config
            .apply_overrides(|key| (key == ENV_LOG_LEVEL).then(|| "loud".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConnectorError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut settings = ServerSettings::default();
        settings.base_url = "localhost:8888".to_string();
        assert!(settings.validate().is_err());

        settings.base_url = "ftp://files.example.com/".to_string();
        assert!(settings.validate().is_err());

        settings.base_url = "relative/path".to_string();
        assert!(settings.validate().is_err());
    }
}
