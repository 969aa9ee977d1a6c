//! Pixel surface sizing for raster export.
//!
//! The diagram is padded by [`EXPORT_PADDING`] logical units on every side and
//! the padded area is then scaled by [`EXPORT_SCALE`]; a `W×H` diagram yields a
//! `(W+80)*2 × (H+80)*2` surface.

use resvg::tiny_skia::Transform;

use crate::markup::LogicalSize;

/// Blank margin around the diagram, in logical units, per side.
pub const EXPORT_PADDING: f32 = 40.0;

/// Up-sampling factor applied after padding.
pub const EXPORT_SCALE: f32 = 2.0;

/// Largest surface edge, in pixels, the exporter will allocate.
pub const MAX_SURFACE_EDGE: u32 = 16_384;

/// Size of the offscreen surface and where the diagram lands on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    pub logical: LogicalSize,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl SurfaceGeometry {
    pub fn for_logical(logical: LogicalSize) -> Self {
        // Fractional pixel edges are truncated.
        let edge = |v: f32| ((v + 2.0 * EXPORT_PADDING) * EXPORT_SCALE).floor() as u32;
        Self {
            logical,
            pixel_width: edge(logical.width),
            pixel_height: edge(logical.height),
        }
    }

    /// Whether the surface is small enough to allocate.
    pub fn fits(&self) -> bool {
        self.pixel_width <= MAX_SURFACE_EDGE && self.pixel_height <= MAX_SURFACE_EDGE
    }

    /// Maps diagram coordinates onto the surface: offset by the padding,
    /// then scaled.
    pub fn transform(&self) -> Transform {
        Transform::from_scale(EXPORT_SCALE, EXPORT_SCALE)
            .pre_translate(EXPORT_PADDING, EXPORT_PADDING)
    }
}
