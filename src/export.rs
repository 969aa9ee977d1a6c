//! Export of the mounted diagram as a downloadable image.
//!
//! The primary artifact is a PNG drawn onto a padded, upscaled white surface;
//! when that cannot be produced the serialized SVG is saved instead, so an
//! export of a mounted diagram always yields exactly one file.
//!
//! # Sub-modules
//!
//! - [`artifact`]: export artifacts and filename rules
//! - [`geometry`]: pad-then-upscale surface arithmetic
//! - [`raster`]: `RasterExporter`, the two-tier export itself
//! - [`save`]: the save-to-disk primitive
//! - [`trigger`]: `ExportTrigger`, timestamped exports for the host

pub mod artifact;
pub mod geometry;
pub mod raster;
pub mod save;
pub mod trigger;

pub use artifact::{ArtifactKind, DEFAULT_EXPORT_FILENAME, ExportArtifact};
pub use geometry::{EXPORT_PADDING, EXPORT_SCALE, MAX_SURFACE_EDGE, SurfaceGeometry};
pub use raster::{ExportError, ExportOutcome, RasterExporter};
pub use save::{DirectoryTarget, SaveTarget};
pub use trigger::ExportTrigger;
