//! Wiring of controller, exporter and trigger around one mount point.

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::engine::VectorRenderEngine;
use crate::export::{ExportTrigger, RasterExporter, SaveTarget};
use crate::mount::MountPoint;
use crate::render::RenderController;

/// Everything a host needs for one diagram view.
///
/// The controller is the only writer of the shared mount point; the
/// exporter and trigger only read it.
pub struct DiagramPipeline<E: VectorRenderEngine> {
    pub controller: RenderController<E>,
    pub exporter: Arc<RasterExporter>,
    pub trigger: ExportTrigger,
}

impl<E: VectorRenderEngine> DiagramPipeline<E> {
    pub fn new(
        engine: E,
        runtime: Handle,
        target: Arc<dyn SaveTarget>,
        filename_prefix: impl Into<String>,
    ) -> Self {
        let mount = MountPoint::new();
        let exporter = Arc::new(RasterExporter::new(mount.clone(), target));
        let trigger = ExportTrigger::new(Arc::clone(&exporter), filename_prefix);
        Self {
            controller: RenderController::new(engine, mount, runtime),
            exporter,
            trigger,
        }
    }

    pub fn mount(&self) -> &MountPoint {
        self.controller.mount()
    }
}
