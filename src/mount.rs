//! The mount point: the single visual container the host displays.
//!
//! It holds exactly one of: nothing, a rendered diagram, or an error panel.
//! Content is replaced as a whole value; readers get a clone, so nothing
//! outside the render controller can change what is displayed.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::engine::RenderError;
use crate::markup::RenderedMarkup;

/// Summary line shown on every compile failure.
pub const ERROR_PANEL_SUMMARY: &str = "Error rendering diagram";

/// Human-readable explanation of a failed render: a short summary plus the
/// full engine detail behind a disclosure control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPanel {
    summary: String,
    detail: String,
}

impl ErrorPanel {
    pub fn from_error(error: &RenderError) -> Self {
        Self {
            summary: ERROR_PANEL_SUMMARY.to_string(),
            detail: error.to_string(),
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        format!("{}\n\n{}", self.summary, self.detail)
    }

    /// HTML fragment with the detail collapsed inside `<details>`.
    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"diagram-error\" role=\"alert\">\
             <p class=\"diagram-error-summary\">{}</p>\
             <details><summary>Show details</summary><pre>{}</pre></details>\
             </div>",
            escape_html(&self.summary),
            escape_html(&self.detail)
        )
    }
}

/// What the mount point currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MountContent {
    /// Idle: no description, nothing displayed.
    #[default]
    Empty,
    Diagram(RenderedMarkup),
    Error(ErrorPanel),
}

/// Shared handle to the visual container.
///
/// Cloning the handle shares the container. Only the render controller
/// writes to it.
#[derive(Debug, Clone, Default)]
pub struct MountPoint {
    content: Arc<RwLock<MountContent>>,
}

impl MountPoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current content.
    pub fn snapshot(&self) -> MountContent {
        self.content.read().clone()
    }

    /// Copy of the mounted diagram, if one is displayed.
    pub fn mounted_markup(&self) -> Option<RenderedMarkup> {
        match &*self.content.read() {
            MountContent::Diagram(markup) => Some(markup.clone()),
            MountContent::Empty | MountContent::Error(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(*self.content.read(), MountContent::Empty)
    }

    pub(crate) fn replace(&self, content: MountContent) {
        *self.content.write() = content;
    }

    pub(crate) fn clear(&self) {
        self.replace(MountContent::Empty);
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
