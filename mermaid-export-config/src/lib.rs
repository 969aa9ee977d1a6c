//! Configuration system for the mermaid-export diagram pipeline.
//!
//! This crate provides configuration loading, saving, validation and default
//! values for the render controller and raster exporter:
//!
//! - Render settings applied once to the Mermaid engine (font family, size)
//! - Export settings (output directory, timestamped filename prefix)
//! - Log level used by the binary's debug logger

pub mod config;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::{Config, ExportSettings, RenderSettings};
pub use error::ConfigError;
pub use types::LogLevel;
