//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Report rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Use ANSI colours and highlighting
    #[serde(default = "default_true")]
    pub color: bool,

    /// Use emoji glyphs for day categories instead of ASCII letters
    #[serde(default = "default_true")]
    pub emoji: bool,

    /// Column label for the official system
    #[serde(default = "default_official_label")]
    pub official_label: String,

    /// Column label for the secondary system
    #[serde(default = "default_secondary_label")]
    pub secondary_label: String,
}

fn default_true() -> bool {
    true
}

fn default_official_label() -> String {
    "Official".to_string()
}

fn default_secondary_label() -> String {
    "Secondary".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            color: default_true(),
            emoji: default_true(),
            official_label: default_official_label(),
            secondary_label: default_secondary_label(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding snapshot files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub render: RenderConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            render: RenderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Log level must not be empty".to_string(),
            ));
        }

        if self.render.official_label.trim().is_empty()
            || self.render.secondary_label.trim().is_empty()
        {
            return Err(ConfigError::ValidationError(
                "Source labels must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert!(config.render.color);
        assert!(config.render.emoji);
        assert_eq!(config.render.official_label, "Official");
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_label() {
        let mut config = AppConfig::default();
        config.render.secondary_label = "  ".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_log_level() {
        let mut config = AppConfig::default();
        config.log_level = String::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            data_dir = "/tmp/timo"

            [render]
            emoji = false
            official_label = "Timenet"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/timo"));
        assert_eq!(config.log_level, "info");
        assert!(!config.render.emoji);
        assert!(config.render.color);
        assert_eq!(config.render.official_label, "Timenet");
        assert_eq!(config.render.secondary_label, "Secondary");
    }

    #[test]
    fn test_invalid_toml() {
        let result = AppConfig::from_toml("data_dir = [");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load_or_default(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "log_level = \"debug\"\n").unwrap();

        let config = AppConfig::load_or_default(&path).unwrap();
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(config.render.secondary_label, parsed.render.secondary_label);
    }
}
