//! The `Config` struct, its defaults, and YAML persistence.
//!
//! Covers:
//! - `load` / `load_from` / `save` / `save_to` (YAML file I/O with atomic write)
//! - XDG-compliant path helpers (`config_path`, `config_dir`)
//! - Semantic validation (`validate`)

use crate::error::ConfigError;
use crate::types::LogLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default filename prefix for timestamped exports.
pub const DEFAULT_FILENAME_PREFIX: &str = "mermaid-diagram";

fn default_font_family() -> String {
    "sans-serif".to_string()
}

fn default_font_size() -> f32 {
    14.0
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_filename_prefix() -> String {
    DEFAULT_FILENAME_PREFIX.to_string()
}

/// Theme settings applied once to the Mermaid engine before the first render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Font family written into rendered SVG text.
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Base font size in logical units.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: default_font_size(),
        }
    }
}

/// Where exports are written and how they are named.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory the save action writes into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Prefix for `<prefix>-<timestamp>.png` filenames.
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            filename_prefix: default_filename_prefix(),
        }
    }
}

/// Top-level configuration for the mermaid-export binary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Debug log verbosity (overridden by `--log-level` and `DEBUG_LEVEL`).
    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default)]
    pub render: RenderSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

impl Config {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the export directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export.output_dir = dir.into();
        self
    }

    /// Set the timestamped filename prefix
    pub fn with_filename_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.export.filename_prefix = prefix.into();
        self
    }

    /// Load configuration from the default path, or fall back to defaults
    /// when no file exists yet. Unlike `init`, this never writes a file.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            log::info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml_ng::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(self)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Write the default configuration to the default path unless a file
    /// already exists. Returns the path and whether a file was created.
    pub fn init() -> Result<(PathBuf, bool), ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            return Ok((config_path, false));
        }
        Self::default().save_to(&config_path)?;
        log::info!("Default config created at {:?}", config_path);
        Ok((config_path, true))
    }

    /// Check field values that serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.render.font_size.is_finite() && self.render.font_size > 0.0) {
            return Err(ConfigError::Validation(format!(
                "render.font_size must be a positive number, got {}",
                self.render.font_size
            )));
        }
        if self.render.font_family.trim().is_empty() {
            return Err(ConfigError::Validation(
                "render.font_family must not be empty".to_string(),
            ));
        }
        let prefix = &self.export.filename_prefix;
        if prefix.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export.filename_prefix must not be empty".to_string(),
            ));
        }
        if prefix.contains(['/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "export.filename_prefix must be a bare file name, got {prefix:?}"
            )));
        }
        Ok(())
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("mermaid-export")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            // ~/.config/mermaid-export on every Unix, macOS included
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("mermaid-export")
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, LogLevel::Off);
        assert_eq!(config.render.font_family, "sans-serif");
        assert_eq!(config.render.font_size, 14.0);
        assert_eq!(config.export.output_dir, PathBuf::from("."));
        assert_eq!(config.export.filename_prefix, "mermaid-diagram");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
export:
  output_dir: "/tmp/diagrams"
"#;
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.export.output_dir, PathBuf::from("/tmp/diagrams"));
        assert_eq!(config.export.filename_prefix, "mermaid-diagram");
        assert_eq!(config.render, RenderSettings::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let config = Config::new()
            .with_output_dir("/srv/exports")
            .with_filename_prefix("video-summary");

        config.save_to(&path).unwrap();
        assert!(!path.with_extension("yaml.tmp").exists());

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.render.font_size = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let config = Config::default().with_filename_prefix("../escape");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let config = Config::default().with_filename_prefix("  ");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_from_rejects_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "render: [not, a, map").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_config_path_ends_with_yaml() {
        let path = Config::config_path();
        assert!(path.ends_with("mermaid-export/config.yaml"));
    }
}
