//! Typed error variants for the mermaid-export-config crate.
//!
//! Config I/O and validation failures are reported through [`ConfigError`]
//! so callers can match on the failure mode instead of formatting strings.
//!
//! # Example
//!
//! ```rust,no_run
//! use mermaid_export_config::{Config, ConfigError};
//!
//! match Config::load() {
//!     Ok(config) => println!("exporting to {}", config.export.output_dir.display()),
//!     Err(ConfigError::Io(io)) => eprintln!("I/O error: {io}"),
//!     Err(ConfigError::Parse(p)) => eprintln!("YAML parse error: {p}"),
//!     Err(ConfigError::Validation(msg)) => eprintln!("Validation: {msg}"),
//! }
//! ```

use std::fmt;

/// Errors that can occur when loading, saving or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    Io(std::io::Error),

    /// The config file contained invalid YAML, or the config could not be
    /// serialized back to YAML.
    Parse(serde_yaml_ng::Error),

    /// A field value failed semantic validation.
    ///
    /// The inner string names the field and the reason.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error reading config: {e}"),
            ConfigError::Parse(e) => write!(f, "YAML parse error in config: {e}"),
            ConfigError::Validation(msg) => write!(f, "Config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml_ng::Error> for ConfigError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        ConfigError::Parse(e)
    }
}
