//! Host-facing export handle.

use std::sync::Arc;

use super::raster::{ExportOutcome, RasterExporter};

/// Single-method capability the host holds to request a download.
///
/// Each call uses a fresh `<prefix>-<timestamp>.png` name so repeated
/// exports in one session do not overwrite each other.
#[derive(Clone)]
pub struct ExportTrigger {
    exporter: Arc<RasterExporter>,
    prefix: String,
}

impl ExportTrigger {
    pub fn new(exporter: Arc<RasterExporter>, prefix: impl Into<String>) -> Self {
        Self {
            exporter,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `<prefix>-<unix millis>.png`
    pub fn timestamped_filename(&self) -> String {
        format!("{}-{}.png", self.prefix, chrono::Utc::now().timestamp_millis())
    }

    pub async fn download_as_png(&self) -> ExportOutcome {
        let filename = self.timestamped_filename();
        log::info!("Export requested as {filename}");
        self.exporter.export_as_image(Some(&filename)).await
    }
}
