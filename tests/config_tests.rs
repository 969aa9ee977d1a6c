use mermaid_export_config::config::DEFAULT_FILENAME_PREFIX;
use mermaid_export_config::{Config, ConfigError, LogLevel};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.log_level, LogLevel::Off);
    assert_eq!(config.render.font_family, "sans-serif");
    assert_eq!(config.render.font_size, 14.0);
    assert_eq!(config.export.output_dir, PathBuf::from("."));
    assert_eq!(config.export.filename_prefix, DEFAULT_FILENAME_PREFIX);
}

#[test]
fn test_config_builders() {
    let config = Config::new()
        .with_output_dir("/tmp/diagrams")
        .with_filename_prefix("arch");
    assert_eq!(config.export.output_dir, PathBuf::from("/tmp/diagrams"));
    assert_eq!(config.export.filename_prefix, "arch");
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let mut config = Config::new().with_filename_prefix("flow");
    config.log_level = LogLevel::Debug;
    config.render.font_size = 16.0;
    config.save_to(&path).unwrap();

    assert!(!path.with_extension("yaml.tmp").exists());
    assert_eq!(Config::load_from(&path).unwrap(), config);
}

#[test]
fn test_partial_yaml_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "export:\n  output_dir: out\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.export.output_dir, PathBuf::from("out"));
    assert_eq!(config.export.filename_prefix, DEFAULT_FILENAME_PREFIX);
    assert_eq!(config.render, Default::default());
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "render:\n  font_size: -3\n").unwrap();

    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn test_malformed_yaml_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "log_level: [not, a, level\n").unwrap();

    assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn test_prefix_with_path_separator_is_rejected() {
    let config = Config::new().with_filename_prefix("../escape");
    assert!(config.validate().is_err());
}
