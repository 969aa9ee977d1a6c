//! Export artifacts and the filename rules that go with them.

use std::path::Path;

/// Filename used when the caller does not supply one.
pub const DEFAULT_EXPORT_FILENAME: &str = "mermaid-diagram.png";

/// Encoding of an export artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// PNG pixels.
    Raster,
    /// Serialized SVG text.
    Vector,
}

impl ArtifactKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Raster => "png",
            ArtifactKind::Vector => "svg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ArtifactKind::Raster => "image/png",
            ArtifactKind::Vector => "image/svg+xml",
        }
    }
}

/// Bytes ready to be saved under `filename`. Built per export and dropped
/// once the save action has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub kind: ArtifactKind,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn raster(filename: impl Into<String>, png: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            kind: ArtifactKind::Raster,
            bytes: png,
        }
    }

    pub fn vector(filename: impl Into<String>, svg: String) -> Self {
        Self {
            filename: filename.into(),
            kind: ArtifactKind::Vector,
            bytes: svg.into_bytes(),
        }
    }
}

/// Reduce a caller-supplied name to a bare file name, or the default.
///
/// Directory components are dropped so a hint can never write outside the
/// save target's directory.
pub fn resolve_filename(hint: Option<&str>) -> String {
    hint.map(str::trim)
        .filter(|h| !h.is_empty())
        .and_then(|h| Path::new(h).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_EXPORT_FILENAME.to_string())
}

/// Same base name with the vector extension.
pub fn vector_fallback_filename(filename: &str) -> String {
    Path::new(filename)
        .with_extension(ArtifactKind::Vector.extension())
        .to_string_lossy()
        .into_owned()
}
