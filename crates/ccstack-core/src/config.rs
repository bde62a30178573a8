//! # Configuration System
//!
//! YAML configuration for decoding runs:
//!
//! - Code parameters (register lengths, generator polynomials)
//! - Search bounds (node budget, metric floor) and metric settings
//! - Logging
//!
//! ## Configuration Search Path
//!
//! Configuration is loaded from the first file found:
//! 1. Path specified via `CCSTACK_CONFIG` environment variable
//! 2. `./ccstack.yaml` (current directory)
//! 3. `~/.config/ccstack/config.yaml` (user config)
//! 4. `/etc/ccstack/config.yaml` (system config)
//!
//! ## Example Configuration
//!
//! ```yaml
//! code:
//!   constraints: [7]
//!   generators: [[121, 91]]   # 0o171, 0o133
//!
//! decoder:
//!   node_budget: 100000
//!   metric_floor: -60.0
//!   zero_tail: true
//!   edge_bias: 0.5
//!
//! logging:
//!   level: debug
//!   format: compact
//! ```

use crate::fec::convolutional::{CodeConfig, ConvolutionalEncoder};
use crate::fec::stack::{DecoderConfig, StackDecoder};
use crate::observe::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "CCSTACK_CONFIG";

/// Error type for configuration operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("config not found: {0}")]
    NotFound(String),

    #[error("failed to read config: {0}")]
    Read(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CcstackConfig {
    pub code: CodeConfig,
    pub decoder: DecoderConfig,
    pub logging: LogConfig,
}

impl Default for CcstackConfig {
    fn default() -> Self {
        Self {
            code: CodeConfig::nasa_k7_rate_half(),
            decoder: DecoderConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl CcstackConfig {
    /// Load configuration from the default search path.
    ///
    /// Returns the default config if no file is found.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(ConfigError::NotFound(format!(
                    "{} points to {}",
                    CONFIG_ENV,
                    path.display()
                )));
            }
            return Self::load_from(&path);
        }

        match Self::config_search_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;

        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), code = %config.code, "configuration loaded");
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_yaml()?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Get configuration search paths.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./ccstack.yaml")];

        if let Some(dirs) = directories::ProjectDirs::from("", "", "ccstack") {
            paths.push(dirs.config_dir().join("config.yaml"));
        }

        paths.push(PathBuf::from("/etc/ccstack/config.yaml"));
        paths
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.code
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        if !self.decoder.edge_bias.is_finite() {
            return Err(ConfigError::Validation("edge_bias must be finite".to_string()));
        }

        if let Some(floor) = self.decoder.metric_floor {
            if !floor.is_finite() {
                return Err(ConfigError::Validation("metric_floor must be finite".to_string()));
            }
        }

        Ok(())
    }

    /// Build an encoder and a stack decoder from this configuration.
    pub fn build_decoder(&self) -> Result<StackDecoder<ConvolutionalEncoder>, ConfigError> {
        let encoder = ConvolutionalEncoder::new(self.code.clone())
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        Ok(StackDecoder::new(encoder, self.decoder.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CcstackConfig::default();
        assert_eq!(config.code, CodeConfig::nasa_k7_rate_half());
        assert_eq!(config.decoder.node_budget, None);
        assert!(!config.decoder.zero_tail);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
code:
  constraints: [3]
  generators: [[7, 5]]

decoder:
  node_budget: 5000
  metric_floor: -40.0
  zero_tail: true
  edge_bias: 0.5

logging:
  level: debug
  format: json
"#;

        let config = CcstackConfig::parse(yaml).unwrap();
        assert_eq!(config.code, CodeConfig::simple_k3());
        assert_eq!(config.decoder.node_budget, Some(5000));
        assert_eq!(config.decoder.metric_floor, Some(-40.0));
        assert!(config.decoder.zero_tail);
        assert_eq!(config.decoder.edge_bias, 0.5);
        assert_eq!(config.logging.level, crate::observe::LogLevel::Debug);
        assert_eq!(config.logging.format, crate::observe::LogFormat::Json);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = CcstackConfig::parse("decoder:\n  edge_bias: 1.5\n").unwrap();
        assert_eq!(config.code, CodeConfig::nasa_k7_rate_half());
        assert_eq!(config.decoder.edge_bias, 1.5);
        assert_eq!(config.decoder.metric_floor, None);
    }

    #[test]
    fn test_invalid_code_rejected() {
        let yaml = "code:\n  constraints: [3]\n  generators: [[15, 5]]\n";
        assert!(matches!(
            CcstackConfig::parse(yaml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            CcstackConfig::parse("decoder: [1, 2"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = CcstackConfig::default();
        config.decoder.node_budget = Some(1234);
        config.decoder.metric_floor = Some(-12.5);

        let yaml = config.to_yaml().unwrap();
        let parsed = CcstackConfig::parse(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = CcstackConfig::load_from(Path::new("/nonexistent/ccstack.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read(_)));
    }

    #[test]
    fn test_build_decoder() {
        let config = CcstackConfig::parse("code:\n  constraints: [3]\n  generators: [[7, 5]]\ndecoder:\n  zero_tail: true\n").unwrap();
        let decoder = config.build_decoder().unwrap();
        assert!(decoder.config().zero_tail);
        assert_eq!(decoder.node_count(), 0);
    }

    #[test]
    fn test_search_paths() {
        let paths = CcstackConfig::config_search_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from("./ccstack.yaml")));
        assert_eq!(paths.last(), Some(&PathBuf::from("/etc/ccstack/config.yaml")));
    }
}
