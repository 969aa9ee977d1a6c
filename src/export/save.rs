//! Save-to-disk primitive used by the exporter.
//!
//! [`DirectoryTarget`] stages every artifact in a temporary file inside the
//! destination directory and renames it into place. The staging file is
//! owned by a `NamedTempFile`, so it is removed on every path that does not
//! end in a successful rename.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::artifact::ExportArtifact;

/// Something that can persist an export artifact for the user.
pub trait SaveTarget: Send + Sync {
    /// Save `artifact` and return where it ended up.
    fn save(&self, artifact: &ExportArtifact) -> io::Result<PathBuf>;
}

/// Writes artifacts into a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveTarget for DirectoryTarget {
    fn save(&self, artifact: &ExportArtifact) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let destination = self.dir.join(&artifact.filename);

        let mut staging = tempfile::Builder::new()
            .prefix(".mermaid-export-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        staging.write_all(&artifact.bytes)?;
        staging.flush()?;
        staging.persist(&destination).map_err(|e| e.error)?;

        log::info!(
            "Saved {} ({} bytes) to {}",
            artifact.kind.mime_type(),
            artifact.bytes.len(),
            destination.display()
        );
        Ok(destination)
    }
}
