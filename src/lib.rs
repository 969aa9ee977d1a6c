// Library exports for the binary and integration tests
//
// All mount point state lives behind `parking_lot` locks that are never held
// across an `.await`; the two suspension points (engine compile and
// intermediate image decode) run on Tokio's blocking pool.

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod cli;
pub mod engine;
pub mod export;
pub mod markup;
pub mod mount;
pub mod pipeline;
pub mod render;
pub mod source;
pub(crate) mod svg_utils;
pub mod watch;

pub use engine::{MermaidEngine, RenderError, VectorRenderEngine};
pub use export::{
    DirectoryTarget, ExportArtifact, ExportError, ExportOutcome, ExportTrigger, RasterExporter,
    SaveTarget,
};
pub use markup::{LogicalSize, RenderedMarkup};
pub use mount::{ErrorPanel, MountContent, MountPoint};
pub use pipeline::DiagramPipeline;
pub use render::{AttemptId, CommitStatus, RenderController, RenderOutcome, RenderTask};
