//! Layered configuration for sentry-autofix.
//!
//! Values are resolved file → environment → CLI, each layer overriding the
//! previous one. The file lives at `.autofix/autofix.toml` by default:
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 5000
//! dev_mode = false
//!
//! [worker]
//! shutdown_grace_secs = 5
//!
//! [logging]
//! level = "info"
//! json = false
//! dir = ".autofix/logs"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = ".autofix/autofix.toml";

pub const DEFAULT_HOST: &str = "127.0.0.1";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutofixConfig {
    pub server: ServerSection,
    pub worker: WorkerSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Permissive CORS; also binds all interfaces when `host` is left at the default.
    pub dev_mode: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: 5000,
            dev_mode: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSection {
    pub shutdown_grace_secs: u64,
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub json: bool,
    /// Directory for a daily-rolling log file. Console only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            dir: None,
        }
    }
}

/// Overrides collected from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dev_mode: bool,
    pub verbose: bool,
}

impl AutofixConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from `path`, or defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize autofix.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply `AUTOFIX_*` environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("AUTOFIX_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("AUTOFIX_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "AUTOFIX_PORT".to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(level) = lookup("AUTOFIX_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("AUTOFIX_LOG_JSON") {
            self.logging.json = parse_bool("AUTOFIX_LOG_JSON", &json)?;
        }
        Ok(())
    }

    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if cli.dev_mode {
            self.server.dev_mode = true;
        }
        if cli.verbose {
            self.logging.level = "debug".to_string();
        }
    }

    /// Resolve the effective configuration: file, then process environment,
    /// then CLI flags.
    pub fn resolve(path: &Path, cli: &CliOverrides) -> Result<Self, ConfigError> {
        let mut config = Self::load_or_default(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_cli(cli);
        Ok(config)
    }

    /// Non-fatal problems worth reporting to the user.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.server.port == 0 {
            warnings.push("server.port is 0; the OS will pick a random port".to_string());
        }
        if self.worker.shutdown_grace_secs == 0 {
            warnings.push(
                "worker.shutdown_grace_secs is 0; pending classifications are abandoned on shutdown"
                    .to_string(),
            );
        }
        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            warnings.push(format!("logging.level '{}' is not a valid filter", self.logging.level));
        }
        warnings
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AutofixConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert!(!config.server.dev_mode);
        assert_eq!(config.worker.shutdown_grace_secs, 5);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = AutofixConfig::parse("[server]\nport = 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_rejects_wrong_type() {
        assert!(AutofixConfig::parse("[server]\nport = \"eighty\"\n").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = AutofixConfig::load_or_default(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, AutofixConfig::default());
    }

    #[test]
    fn test_load_reports_parse_failure_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("autofix.toml");
        std::fs::write(&path, "[server\nport = 1").unwrap();
        match AutofixConfig::load(&path) {
            Err(ConfigError::ParseFailed { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected ParseFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".autofix").join("autofix.toml");
        let mut config = AutofixConfig::default();
        config.server.port = 7000;
        config.logging.json = true;
        config.save(&path).unwrap();

        let loaded = AutofixConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = AutofixConfig::parse("[server]\nport = 8080\n").unwrap();
        config
            .apply_env(env(&[
                ("AUTOFIX_PORT", "9090"),
                ("AUTOFIX_HOST", "10.0.0.1"),
                ("AUTOFIX_LOG_JSON", "true"),
            ]))
            .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "10.0.0.1");
        assert!(config.logging.json);
    }

    #[test]
    fn test_env_invalid_port() {
        let mut config = AutofixConfig::default();
        let err = config.apply_env(env(&[("AUTOFIX_PORT", "abc")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "AUTOFIX_PORT"));
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = AutofixConfig::default();
        config.apply_env(env(&[("AUTOFIX_PORT", "9090")])).unwrap();
        config.apply_cli(&CliOverrides {
            port: Some(6000),
            dev_mode: true,
            verbose: true,
            ..CliOverrides::default()
        });
        assert_eq!(config.server.port, 6000);
        assert!(config.server.dev_mode);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validate_flags_zero_grace() {
        let mut config = AutofixConfig::default();
        config.worker.shutdown_grace_secs = 0;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("shutdown_grace_secs"));
    }
}
