use anyhow::Result;
use clap::Parser;
use mermaid_export::cli::{self, Cli};
use mermaid_export::engine::MermaidEngine;
use mermaid_export_config::LogLevel;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli::load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("mermaid-export: error: {e:#}");
            std::process::exit(2);
        }
    };

    // --log-level wins, then DEBUG_LEVEL, then the config file.
    let level = cli.log_level.or_else(|| {
        (config.log_level != LogLevel::Off && std::env::var("DEBUG_LEVEL").is_err())
            .then_some(config.log_level)
    });
    mermaid_export::debug::init_log_bridge(level);

    log::info!("Starting mermaid-export {}", mermaid_export::VERSION);
    MermaidEngine::initialize(&config.render);

    let runtime = Arc::new(Runtime::new()?);
    let result = cli::run(cli, &config, &runtime);

    log::info!("Command finished, shutting down runtime");
    if let Some(rt) = Arc::try_unwrap(runtime).ok() {
        rt.shutdown_timeout(std::time::Duration::from_secs(2));
    }

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("mermaid-export: error: {e:#}");
            std::process::exit(1);
        }
    }
}
