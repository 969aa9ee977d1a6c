//! Command-line interface for mermaid-export.
//!
//! The binary is the host surface: it supplies descriptions, shows error
//! panels on stderr, and triggers exports into the configured directory.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

use mermaid_export_config::{Config, LogLevel};

use crate::engine::MermaidEngine;
use crate::export::{DirectoryTarget, ExportArtifact, ExportOutcome, SaveTarget};
use crate::mount::MountContent;
use crate::pipeline::DiagramPipeline;
use crate::render::CommitStatus;
use crate::source::DescriptionSource;
use crate::watch::DescriptionWatcher;

/// mermaid-export - render Mermaid diagrams and export them as PNG
#[derive(Parser)]
#[command(name = "mermaid-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug log level (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Configuration file (default: ~/.config/mermaid-export/config.yaml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a description once and export it
    Render(RenderArgs),

    /// Re-render and export every time a description file changes
    Watch(WatchArgs),

    /// Write the default configuration file
    InitConfig,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Description file; omit or pass `-` to read stdin
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Directory to save exports into (overrides config)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Export filename (default: timestamped `<prefix>-<millis>.png`)
    #[arg(short, long, value_name = "FILE")]
    pub name: Option<String>,

    /// Also save the rendered SVG next to the export
    #[arg(long)]
    pub svg: bool,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Description file to watch
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory to save exports into (overrides config)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Quiet time after the last edit before re-rendering, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 200)]
    pub debounce_ms: u64,
}

/// Load the config named on the command line, or the default one.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    Ok(config)
}

/// Run the parsed command. Returns the process exit code.
pub fn run(cli: Cli, config: &Config, runtime: &Runtime) -> Result<i32> {
    match cli.command {
        Commands::Render(args) => run_render(args, config, runtime),
        Commands::Watch(args) => run_watch(args, config, runtime),
        Commands::InitConfig => {
            let (path, created) = Config::init().context("Failed to write default config")?;
            if created {
                println!("Wrote default config to {}", path.display());
            } else {
                println!("Config already exists at {}", path.display());
            }
            Ok(0)
        }
    }
}

fn build_pipeline(
    output_dir: Option<PathBuf>,
    config: &Config,
    runtime: &Runtime,
) -> (DiagramPipeline<MermaidEngine>, Arc<DirectoryTarget>) {
    let dir = output_dir.unwrap_or_else(|| config.export.output_dir.clone());
    let target = Arc::new(DirectoryTarget::new(dir));
    let pipeline = DiagramPipeline::new(
        MermaidEngine::new(),
        runtime.handle().clone(),
        Arc::clone(&target) as Arc<dyn SaveTarget>,
        config.export.filename_prefix.clone(),
    );
    (pipeline, target)
}

fn run_render(args: RenderArgs, config: &Config, runtime: &Runtime) -> Result<i32> {
    let source = DescriptionSource::from_arg(args.input.as_deref());
    let description = source
        .read()
        .context("Failed to read diagram description")?;

    let (pipeline, target) = build_pipeline(args.output_dir, config, runtime);

    let Some(task) = pipeline.controller.on_description_change(&description) else {
        println!("Description is empty; nothing to render.");
        return Ok(0);
    };
    let status = runtime.block_on(task.wait());
    log::debug!("Render finished with status {status:?}");

    match pipeline.mount().snapshot() {
        MountContent::Error(panel) => {
            eprintln!("{}", panel.to_text());
            Ok(1)
        }
        MountContent::Empty => {
            eprintln!("Render did not complete.");
            Ok(1)
        }
        MountContent::Diagram(markup) => {
            let outcome = runtime.block_on(async {
                match args.name.as_deref() {
                    Some(name) => pipeline.exporter.export_as_image(Some(name)).await,
                    None => pipeline.trigger.download_as_png().await,
                }
            });
            let code = report_export(&outcome);

            if args.svg {
                let svg_name = outcome
                    .path()
                    .and_then(|p| p.file_stem())
                    .map(|stem| format!("{}.rendered.svg", stem.to_string_lossy()))
                    .unwrap_or_else(|| "mermaid-diagram.rendered.svg".to_string());
                let artifact = ExportArtifact::vector(svg_name, markup.into_string());
                let path = target
                    .save(&artifact)
                    .context("Failed to save rendered SVG")?;
                println!("Saved {}", path.display());
            }
            Ok(code)
        }
    }
}

fn run_watch(args: WatchArgs, config: &Config, runtime: &Runtime) -> Result<i32> {
    let watcher = DescriptionWatcher::new(&args.input, args.debounce_ms, 250)?;
    let (pipeline, _target) = build_pipeline(args.output_dir, config, runtime);
    let pipeline = Arc::new(pipeline);
    let source = DescriptionSource::File(watcher.path().to_path_buf());

    println!(
        "Watching {} (Ctrl-C to stop)",
        display_path(watcher.path())
    );
    submit(&pipeline, &source, runtime);
    loop {
        if let Some(change) = watcher.recv_timeout(Duration::from_secs(1)) {
            submit(&pipeline, &DescriptionSource::File(change.path), runtime);
        }
    }
}

/// Read the description and hand it to the controller; export once the
/// attempt commits.
fn submit(
    pipeline: &Arc<DiagramPipeline<MermaidEngine>>,
    source: &DescriptionSource,
    runtime: &Runtime,
) {
    let text = match source.read() {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Failed to read description: {e}");
            return;
        }
    };
    if text.trim().is_empty() {
        println!("Description is empty; display cleared.");
    }
    let Some(task) = pipeline.controller.on_description_change(&text) else {
        return;
    };

    let pipeline = Arc::clone(pipeline);
    runtime.spawn(async move {
        if task.wait().await != CommitStatus::Committed {
            return;
        }
        match pipeline.mount().snapshot() {
            MountContent::Error(panel) => eprintln!("{}", panel.to_text()),
            MountContent::Diagram(_) => {
                report_export(&pipeline.trigger.download_as_png().await);
            }
            MountContent::Empty => {}
        }
    });
}

/// Print the export result; returns the exit code it implies.
fn report_export(outcome: &ExportOutcome) -> i32 {
    match outcome {
        ExportOutcome::Raster { path } => {
            println!("Saved {}", display_path(path));
            0
        }
        ExportOutcome::VectorFallback { path, reason } => {
            println!("Saved {} (PNG unavailable: {reason})", display_path(path));
            0
        }
        ExportOutcome::Skipped => {
            println!("Nothing to export.");
            0
        }
        ExportOutcome::SaveFailed { error, .. } => {
            eprintln!("Failed to save export: {error}");
            1
        }
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
