//! RasterExporter: mounted SVG → padded, upscaled PNG, with an SVG fallback.
//!
//! The exporter only ever reads the mount point. It works on a clone of the
//! mounted markup, stamps explicit dimensions on the clone, and rasterizes
//! that. Two failures are recoverable by falling back to saving the
//! serialized SVG text instead:
//!
//! - the intermediate image cannot be decoded from the serialized markup
//!   (this includes markup whose dimensions cannot be determined)
//! - the pixel surface cannot be allocated or encoded as PNG

use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use resvg::tiny_skia::{Color, Pixmap};
use resvg::usvg;

use crate::markup::{LogicalSize, RenderedMarkup};
use crate::mount::MountPoint;
use crate::svg_utils;

use super::artifact::{self, ArtifactKind, ExportArtifact};
use super::geometry::SurfaceGeometry;
use super::save::SaveTarget;

const SVG_DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

/// Why the raster tier of an export did not produce a PNG.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("diagram has no usable viewBox and its rendered size could not be measured")]
    Dimensions,

    #[error("failed to decode serialized SVG: {0}")]
    Decode(String),

    #[error("cannot allocate a {width}x{height} pixel surface")]
    Surface { width: u32, height: u32 },

    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

/// What an export call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing was mounted, so there was nothing to export.
    Skipped,
    /// A PNG was saved.
    Raster { path: PathBuf },
    /// The raster tier failed; the SVG text was saved instead.
    VectorFallback { path: PathBuf, reason: ExportError },
    /// The artifact was built but the save action itself failed.
    SaveFailed { kind: ArtifactKind, error: String },
}

impl ExportOutcome {
    /// Path of the file that was produced, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ExportOutcome::Raster { path } | ExportOutcome::VectorFallback { path, .. } => {
                Some(path)
            }
            ExportOutcome::Skipped | ExportOutcome::SaveFailed { .. } => None,
        }
    }
}

/// Converts the mounted diagram into a downloadable image.
pub struct RasterExporter {
    mount: MountPoint,
    target: Arc<dyn SaveTarget>,
}

impl RasterExporter {
    pub fn new(mount: MountPoint, target: Arc<dyn SaveTarget>) -> Self {
        Self { mount, target }
    }

    /// Export the mounted diagram as `filename` (default
    /// `mermaid-diagram.png`), falling back to an `.svg` file of the same
    /// base name when no PNG can be produced.
    ///
    /// With nothing mounted this is a silent no-op. No error escapes: the
    /// outcome reports what happened.
    pub async fn export_as_image(&self, filename: Option<&str>) -> ExportOutcome {
        let Some(markup) = self.mount.mounted_markup() else {
            crate::debug_log!("EXPORT", "Nothing mounted; export skipped");
            return ExportOutcome::Skipped;
        };
        let filename = artifact::resolve_filename(filename);

        let size = intrinsic_size(&markup);
        // The clone carries the stamped dimensions; the mounted value is never edited.
        let serialized = match size {
            Some(size) => markup.with_dimensions(size).into_string(),
            None => markup.into_string(),
        };

        let rasterized = match size {
            Some(size) => rasterize(&serialized, size).await,
            None => Err(ExportError::Dimensions),
        };

        match rasterized {
            Ok(png) => {
                let artifact = ExportArtifact::raster(filename, png);
                match self.target.save(&artifact) {
                    Ok(path) => ExportOutcome::Raster { path },
                    Err(e) => save_failed(&artifact, e),
                }
            }
            Err(reason) => {
                log::warn!("PNG export failed ({reason}); saving SVG instead");
                let artifact = ExportArtifact::vector(
                    artifact::vector_fallback_filename(&filename),
                    serialized,
                );
                match self.target.save(&artifact) {
                    Ok(path) => ExportOutcome::VectorFallback { path, reason },
                    Err(e) => save_failed(&artifact, e),
                }
            }
        }
    }
}

fn save_failed(artifact: &ExportArtifact, error: std::io::Error) -> ExportOutcome {
    log::error!("Failed to save {}: {error}", artifact.filename);
    ExportOutcome::SaveFailed {
        kind: artifact.kind,
        error: error.to_string(),
    }
}

/// Logical size of the diagram: the declared `viewBox` when present,
/// otherwise the size it lays out at.
pub fn intrinsic_size(markup: &RenderedMarkup) -> Option<LogicalSize> {
    markup
        .view_box_size()
        .or_else(|| svg_utils::rendered_size(markup))
}

/// Draw the serialized SVG onto a white, padded, upscaled surface and
/// encode it as PNG.
async fn rasterize(serialized: &str, size: LogicalSize) -> Result<Vec<u8>, ExportError> {
    let geometry = SurfaceGeometry::for_logical(size);
    let surface_error = ExportError::Surface {
        width: geometry.pixel_width,
        height: geometry.pixel_height,
    };
    if !geometry.fits() {
        return Err(surface_error);
    }
    let mut pixmap =
        Pixmap::new(geometry.pixel_width, geometry.pixel_height).ok_or(surface_error)?;
    pixmap.fill(Color::WHITE);

    crate::debug_log!(
        "EXPORT",
        "Surface {}x{} for logical {}x{}",
        geometry.pixel_width,
        geometry.pixel_height,
        size.width,
        size.height
    );

    let tree = decode_intermediate(to_data_uri(serialized)).await?;
    resvg::render(&tree, geometry.transform(), &mut pixmap.as_mut());

    encode_png(&pixmap)
}

fn to_data_uri(svg: &str) -> String {
    format!("{SVG_DATA_URI_PREFIX}{}", STANDARD.encode(svg))
}

/// Decode an SVG data URI into a render tree off the async thread.
async fn decode_intermediate(uri: String) -> Result<usvg::Tree, ExportError> {
    tokio::task::spawn_blocking(move || {
        let payload = uri
            .strip_prefix(SVG_DATA_URI_PREFIX)
            .ok_or_else(|| ExportError::Decode("not a base64 SVG data URI".to_string()))?;
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| ExportError::Decode(e.to_string()))?;
        svg_utils::parse_tree(&bytes).map_err(|e| ExportError::Decode(e.to_string()))
    })
    .await
    .map_err(|e| ExportError::Decode(e.to_string()))?
}

fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, ExportError> {
    let mut png_buf = Vec::new();
    // The surface is fully opaque, so premultiplied and straight alpha agree.
    PngEncoder::new(&mut png_buf)
        .write_image(
            pixmap.data(),
            pixmap.width(),
            pixmap.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    crate::debug_info!(
        "EXPORT",
        "PNG encoded: {}x{}, {} bytes",
        pixmap.width(),
        pixmap.height(),
        png_buf.len()
    );
    Ok(png_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_round_trip_decodes() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2"/>"#;
        let uri = to_data_uri(svg);
        assert!(uri.starts_with("data:image/svg+xml;base64,"));

        let rt = tokio::runtime::Runtime::new().unwrap();
        let tree = rt.block_on(decode_intermediate(uri)).unwrap();
        assert_eq!(tree.size().width(), 4.0);
        assert_eq!(tree.size().height(), 2.0);
    }

    #[test]
    fn test_decode_rejects_other_uris() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let err = rt
            .block_on(decode_intermediate("data:text/plain,hi".to_string()))
            .unwrap_err();
        assert!(matches!(err, ExportError::Decode(_)));
    }

    #[test]
    fn test_encode_png_has_signature() {
        let mut pixmap = Pixmap::new(3, 2).unwrap();
        pixmap.fill(Color::WHITE);
        let png = encode_png(&pixmap).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_intrinsic_size_prefers_view_box() {
        let markup = RenderedMarkup::new(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10" viewBox="0 0 300 150"/>"#,
        );
        assert_eq!(intrinsic_size(&markup), LogicalSize::new(300.0, 150.0));
    }
}
