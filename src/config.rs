//! Configuration types for Gopherman

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::Auth;
use crate::{GophermanError, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Recording proxy settings
    #[serde(default)]
    pub recorder: RecorderConfig,
    /// Replay settings
    #[serde(default)]
    pub tester: TesterConfig,
    /// Resource limits
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Recording proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Port to listen on
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Upstream host traffic is forwarded to
    #[serde(default = "default_hostname")]
    pub upstream_host: String,
    /// Upstream port
    #[serde(default)]
    pub upstream_port: u16,
    /// Session directory; defaults to `<home>/.op/gopherman`
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
    /// Auth descriptor written into every persisted collection
    #[serde(default)]
    pub auth: Option<Auth>,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            upstream_host: default_hostname(),
            upstream_port: 0,
            session_dir: None,
            auth: None,
        }
    }
}

/// Replay target configuration; both fields may contain placeholders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TesterConfig {
    /// Target hostname
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Target port
    #[serde(default = "default_tester_port")]
    pub port: String,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            port: default_tester_port(),
        }
    }
}

fn default_listen_port() -> u16 {
    8080
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_tester_port() -> String {
    "3002".to_string()
}

/// Resource limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum concurrent connections
    pub max_connections: usize,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_connections: 1024,
            max_body_size: 16 * 1024 * 1024, // 16 MB
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GophermanError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| GophermanError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate replay target and limits
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        if self.tester.hostname.is_empty() || self.tester.port.is_empty() {
            return Err(GophermanError::ConfigError(
                "tester.hostname and tester.port cannot be empty".to_string(),
            ));
        }

        if self.limits.max_connections == 0 {
            return Err(GophermanError::ConfigError(
                "limits.max_connections must be > 0".to_string(),
            ));
        }

        if self.limits.max_body_size == 0 {
            return Err(GophermanError::ConfigError(
                "limits.max_body_size must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate the recording proxy section
    ///
    /// # Errors
    ///
    /// Returns error if the upstream or listen port is missing
    pub fn validate_recorder(&self) -> Result<()> {
        if self.recorder.upstream_host.is_empty() {
            return Err(GophermanError::ConfigError(
                "recorder.upstream_host cannot be empty".to_string(),
            ));
        }

        if self.recorder.upstream_port == 0 {
            return Err(GophermanError::ConfigError(
                "recorder.upstream_port cannot be 0".to_string(),
            ));
        }

        if self.recorder.listen_port == 0 {
            return Err(GophermanError::ConfigError(
                "recorder.listen_port cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Upstream authority (`host:port`)
    #[must_use]
    pub fn upstream_authority(&self) -> String {
        format!("{}:{}", self.recorder.upstream_host, self.recorder.upstream_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_parse() {
        let config_toml = r#"
            [recorder]
            listen_port = 9000
            upstream_host = "api.internal"
            upstream_port = 3000
            session_dir = "/tmp/sessions"

            [recorder.auth]
            Type = "bearer"

            [recorder.auth.Bearer]
            Key = "token"
            Value = "{{ .token }}"
            Type = "string"

            [tester]
            hostname = "{{ .host }}"
        "#;

        let config: Config = toml::from_str(config_toml).unwrap();
        assert_eq!(config.recorder.listen_port, 9000);
        assert_eq!(config.upstream_authority(), "api.internal:3000");
        assert_eq!(
            config.recorder.session_dir,
            Some(PathBuf::from("/tmp/sessions"))
        );

        let auth = config.recorder.auth.unwrap();
        assert_eq!(auth.kind, "bearer");
        assert_eq!(auth.bearer.value, "{{ .token }}");

        assert_eq!(config.tester.hostname, "{{ .host }}");
        assert_eq!(config.tester.port, "3002");
        assert_eq!(config.limits.max_connections, 1024);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        let config_toml = r#"
            [recorder]
            upstream_port = 3000
        "#;
        file.write_all(config_toml.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        config.validate_recorder().unwrap();
        assert_eq!(config.recorder.listen_port, 8080);
        assert_eq!(config.recorder.upstream_host, "localhost");
        assert!(config.recorder.auth.is_none());
    }

    #[test]
    fn test_invalid_config_no_upstream_port() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.validate_recorder(),
            Err(GophermanError::ConfigError(_))
        ));
    }

    #[test]
    fn test_invalid_config_zero_limits() {
        let config_toml = r#"
            [recorder]
            upstream_port = 3000

            [limits]
            max_connections = 0
            max_body_size = 1024
        "#;

        let config: Config = toml::from_str(config_toml).unwrap();
        assert!(config.validate().is_err());
    }
}
