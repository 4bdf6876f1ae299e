//! Exporter configuration.
//!
//! Settings come from an optional TOML file. Every field has a default, so
//! an empty file (or no file) yields a working exporter that runs
//! `wg show all dump` and listens on port 9101.

use crate::fetch::WgCommand;
use crate::metrics::MetricsServerConfig;
use crate::parse::DumpOptions;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// `command.program` is blank.
    #[error("command program must not be empty")]
    EmptyProgram,
    /// `command.timeout_ms` is zero.
    #[error("command timeout must be greater than zero")]
    InvalidTimeout,
    /// `server.metrics_path` is not absolute.
    #[error("metrics path must start with '/': {0}")]
    InvalidMetricsPath(String),
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Status command settings.
    #[serde(default)]
    pub command: CommandConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the metrics endpoint listens on.
    pub listen_addr: SocketAddr,
    /// Path the metrics are served on.
    pub metrics_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let defaults = MetricsServerConfig::default();
        Self {
            listen_addr: defaults.bind_addr,
            metrics_path: defaults.metrics_path,
        }
    }
}

/// Status command configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Path or name of the `wg` binary.
    pub program: String,
    /// Arguments requesting the machine-readable dump.
    pub args: Vec<String>,
    /// Upper bound on a single invocation, in milliseconds.
    pub timeout_ms: u64,
    /// Drop the first output line before parsing.
    pub skip_first_line: bool,
}

impl Default for CommandConfig {
    fn default() -> Self {
        let defaults = WgCommand::default();
        Self {
            program: defaults.program().to_string(),
            args: defaults.args().to_vec(),
            timeout_ms: defaults.timeout().as_millis() as u64,
            skip_first_line: DumpOptions::default().skip_first_line,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command.program.trim().is_empty() {
            return Err(ConfigError::EmptyProgram);
        }
        if self.command.timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if !self.server.metrics_path.starts_with('/') {
            return Err(ConfigError::InvalidMetricsPath(
                self.server.metrics_path.clone(),
            ));
        }
        Ok(())
    }

    /// Builds the status command described by this configuration.
    pub fn wg_command(&self) -> WgCommand {
        WgCommand::new(
            self.command.program.clone(),
            self.command.args.clone(),
            Duration::from_millis(self.command.timeout_ms),
        )
    }

    /// Dump splitting options described by this configuration.
    pub fn dump_options(&self) -> DumpOptions {
        DumpOptions {
            skip_first_line: self.command.skip_first_line,
        }
    }

    /// Metrics server settings described by this configuration.
    pub fn server_config(&self) -> MetricsServerConfig {
        MetricsServerConfig {
            bind_addr: self.server.listen_addr,
            metrics_path: self.server.metrics_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.listen_addr.port(), 9101);
        assert_eq!(config.command.program, "wg");
        assert_eq!(config.command.args, ["show", "all", "dump"]);
        assert_eq!(config.command.timeout_ms, 5000);
        assert!(config.command.skip_first_line);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        assert_eq!(config.server.metrics_path, "/metrics");
        assert_eq!(config.wg_command().program(), "wg");
    }

    #[test]
    fn test_partial_sections() {
        let config = FileConfig::from_toml(
            r#"
            [server]
            listen_addr = "127.0.0.1:9586"

            [command]
            program = "/usr/bin/wg"
            timeout_ms = 1500
            skip_first_line = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server_config().bind_addr.port(), 9586);
        assert_eq!(config.server.metrics_path, "/metrics");
        assert_eq!(config.command.args, ["show", "all", "dump"]);
        assert_eq!(config.wg_command().timeout(), Duration::from_millis(1500));
        assert!(!config.dump_options().skip_first_line);
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let mut config = FileConfig::default();
        config.command.timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout)
        ));
    }

    #[test]
    fn test_relative_metrics_path_invalid() {
        assert!(matches!(
            FileConfig::from_toml("[server]\nmetrics_path = \"metrics\"\n"),
            Err(ConfigError::InvalidMetricsPath(_))
        ));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(matches!(
            FileConfig::from_toml("[command]\ntimeout_ms = \"soon\"\n"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            FileConfig::from_file("/nonexistent/wireguard-exporter.toml"),
            Err(ConfigError::FileReadError(_))
        ));
    }
}
