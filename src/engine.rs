//! Vector render engine boundary and the native Mermaid implementation.
//!
//! The render controller only knows the [`VectorRenderEngine`] trait: text in,
//! SVG out, asynchronously, possibly failing with an engine-specific message.
//! [`MermaidEngine`] fulfils it with `mermaid-rs-renderer`, running the
//! CPU-bound layout on Tokio's blocking pool so that a compile is a real
//! suspension point for the caller.

use std::future::Future;
use std::sync::OnceLock;

use mermaid_export_config::RenderSettings;

use crate::markup::RenderedMarkup;
use crate::svg_utils::sanitize_svg_font_family;

/// Why a description could not be turned into vector markup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The engine rejected the description.
    #[error("{0}")]
    Compile(String),

    /// The compile task itself did not finish (panicked or was cancelled).
    #[error("render task failed: {0}")]
    Engine(String),
}

/// Compiles diagram-description text into SVG markup.
///
/// Implementations cannot be interrupted mid-compile; callers emulate
/// cancellation by discarding stale results.
pub trait VectorRenderEngine: Send + Sync + 'static {
    fn compile(
        &self,
        description: &str,
    ) -> impl Future<Output = Result<RenderedMarkup, RenderError>> + Send;
}

/// Leading keywords mermaid-rs-renderer can lay out. A header may carry a
/// `-suffix` (`stateDiagram-v2`, `xychart-beta`, `flowchart-elk`).
const DIAGRAM_KEYWORDS: &[&str] = &[
    "flowchart",
    "graph",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "erDiagram",
    "journey",
    "gantt",
    "pie",
    "gitGraph",
    "mindmap",
    "timeline",
    "quadrantChart",
    "requirementDiagram",
    "C4Context",
    "C4Container",
    "C4Component",
    "C4Dynamic",
    "C4Deployment",
    "sankey",
    "xychart",
    "block",
    "packet",
    "architecture",
    "kanban",
    "radar",
];

/// Process-wide theme settings, set at most once before the first render.
static ENGINE_SETTINGS: OnceLock<RenderSettings> = OnceLock::new();

/// Pure-Rust Mermaid renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidEngine;

impl MermaidEngine {
    pub fn new() -> Self {
        Self
    }

    /// Apply theme settings for every subsequent render.
    ///
    /// Only the first call (or the first render, which locks in defaults)
    /// takes effect. Returns `true` when this call's settings were applied.
    pub fn initialize(settings: &RenderSettings) -> bool {
        let mut applied = false;
        ENGINE_SETTINGS.get_or_init(|| {
            applied = true;
            settings.clone()
        });
        if applied {
            log::info!(
                "Mermaid engine initialized (font_family={}, font_size={})",
                settings.font_family,
                settings.font_size
            );
        } else {
            log::debug!("Mermaid engine already initialized; ignoring new settings");
        }
        applied
    }

    /// Settings in effect, falling back to defaults if never initialized.
    pub fn settings() -> &'static RenderSettings {
        ENGINE_SETTINGS.get_or_init(RenderSettings::default)
    }

    /// Compile on the current thread.
    pub fn compile_blocking(description: &str) -> Result<RenderedMarkup, RenderError> {
        // The renderer treats anything without a header as a flowchart.
        if detect_diagram_type(description).is_none() {
            let first = first_content_line(description).unwrap_or_default();
            crate::debug_info!("ENGINE", "No diagram type in {first:?}");
            return Err(RenderError::Compile(format!(
                "No diagram type detected matching given configuration for text: {first}"
            )));
        }

        let settings = Self::settings();
        let mut theme = mermaid_rs_renderer::Theme::modern();
        theme.font_family = settings.font_family.clone();
        theme.font_size = settings.font_size.into();

        let opts = mermaid_rs_renderer::RenderOptions {
            theme,
            layout: mermaid_rs_renderer::LayoutConfig::default(),
        };

        match mermaid_rs_renderer::render_with_options(description, opts) {
            Ok(svg) => {
                crate::debug_info!("ENGINE", "Native Mermaid SVG generated ({} bytes)", svg.len());
                Ok(RenderedMarkup::new(sanitize_svg_font_family(&svg)))
            }
            Err(e) => {
                crate::debug_info!("ENGINE", "Native Mermaid render failed: {e}");
                Err(RenderError::Compile(e.to_string()))
            }
        }
    }
}

/// First line that is not blank, a `%%` comment or directive, or part of a
/// leading `---` frontmatter block.
fn first_content_line(description: &str) -> Option<&str> {
    let mut lines = description.lines().map(str::trim).filter(|l| !l.is_empty());
    let mut line = lines.next()?;
    if line == "---" {
        lines.by_ref().find(|l| *l == "---")?;
        line = lines.next()?;
    }
    std::iter::once(line)
        .chain(lines)
        .find(|l| !l.starts_with("%%"))
}

/// Diagram keyword the description starts with, if any.
pub fn detect_diagram_type(description: &str) -> Option<&'static str> {
    let header = first_content_line(description)?
        .split_whitespace()
        .next()?
        .trim_end_matches(';');
    DIAGRAM_KEYWORDS.iter().copied().find(|keyword| {
        header
            .strip_prefix(keyword)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
    })
}

impl VectorRenderEngine for MermaidEngine {
    fn compile(
        &self,
        description: &str,
    ) -> impl Future<Output = Result<RenderedMarkup, RenderError>> + Send {
        let source = description.to_owned();
        async move {
            tokio::task::spawn_blocking(move || Self::compile_blocking(&source))
                .await
                .unwrap_or_else(|e| Err(RenderError::Engine(e.to_string())))
        }
    }
}
