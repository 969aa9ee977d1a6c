//! Shared integration test helpers for mermaid-export.
//!
//! Include with `mod common;` at the top of a test file. Not every helper
//! is used by every file, hence the `dead_code` allowance.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mermaid_export::export::{ExportArtifact, SaveTarget};
use mermaid_export::{
    CommitStatus, DiagramPipeline, DirectoryTarget, RenderError, RenderedMarkup,
    VectorRenderEngine,
};
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// Descriptions starting with this are rejected by [`ScriptedEngine`].
pub const FAILING_PREFIX: &str = "syntax error";

/// Logical size of the markup [`ScriptedEngine`] produces by default.
pub const SCRIPTED_WIDTH: u32 = 120;
pub const SCRIPTED_HEIGHT: u32 = 60;

#[derive(Default)]
struct ScriptState {
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    canned: Mutex<HashMap<String, String>>,
    calls: AtomicUsize,
}

/// Deterministic engine whose compiles can be held open from the test.
///
/// By default a description compiles immediately to a small SVG that
/// embeds the description text. `hold` makes the next compile of a
/// description wait until the returned sender fires (or is dropped).
#[derive(Clone, Default)]
pub struct ScriptedEngine {
    state: Arc<ScriptState>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block the next compile of `description` until the sender is used.
    pub fn hold(&self, description: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.gates.lock().insert(description.to_string(), rx);
        tx
    }

    /// Return `svg` verbatim when `description` is compiled.
    pub fn respond_with(&self, description: &str, svg: &str) {
        self.state
            .canned
            .lock()
            .insert(description.to_string(), svg.to_string());
    }

    /// Number of compiles started so far.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }
}

/// Markup the scripted engine produces for `description`.
pub fn scripted_svg(description: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {SCRIPTED_WIDTH} {SCRIPTED_HEIGHT}"><rect x="10" y="10" width="100" height="40" fill="#336699"/><desc>{description}</desc></svg>"##
    )
}

impl VectorRenderEngine for ScriptedEngine {
    fn compile(
        &self,
        description: &str,
    ) -> impl Future<Output = Result<RenderedMarkup, RenderError>> + Send {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.state.gates.lock().remove(description);
        let canned = self.state.canned.lock().get(description).cloned();
        let description = description.to_owned();
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if description.starts_with(FAILING_PREFIX) {
                return Err(RenderError::Compile(format!(
                    "Parse error on line 1: {description}"
                )));
            }
            Ok(RenderedMarkup::new(
                canned.unwrap_or_else(|| scripted_svg(&description)),
            ))
        }
    }
}

/// Save target that records artifacts in memory, optionally failing.
#[derive(Default)]
pub struct RecordingTarget {
    saved: Mutex<Vec<ExportArtifact>>,
    fail: bool,
}

impl RecordingTarget {
    pub fn failing() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn saved(&self) -> Vec<ExportArtifact> {
        self.saved.lock().clone()
    }
}

impl SaveTarget for RecordingTarget {
    fn save(&self, artifact: &ExportArtifact) -> io::Result<PathBuf> {
        if self.fail {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read-only",
            ));
        }
        self.saved.lock().push(artifact.clone());
        Ok(PathBuf::from(&artifact.filename))
    }
}

/// A pipeline saving into a fresh temp directory.
///
/// The `TempDir` must outlive every export made through the pipeline.
pub fn pipeline_in_tmp_dir(
    engine: ScriptedEngine,
) -> (DiagramPipeline<ScriptedEngine>, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let target = Arc::new(DirectoryTarget::new(dir.path()));
    let pipeline = DiagramPipeline::new(engine, Handle::current(), target, "mermaid-diagram");
    (pipeline, dir)
}

/// Submit `description` and wait for its attempt to commit.
pub async fn render_committed<E: VectorRenderEngine>(
    pipeline: &DiagramPipeline<E>,
    description: &str,
) {
    let task = pipeline
        .controller
        .on_description_change(description)
        .expect("description should start an attempt");
    assert_eq!(task.wait().await, CommitStatus::Committed);
}

/// Names of the files in `dir`, sorted.
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
