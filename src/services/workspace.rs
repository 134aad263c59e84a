//! Scratch workspace layout and reset.
//!
//! Every upload stages into a fixed set of paths under a caller-owned root
//! directory. The whole set is wiped at the start of each upload cycle so
//! no images, extracted archives or results leak from a previous run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::services::images::loader;
use crate::types::errors::{PipelineError, PipelineResult};

/// Scratch files removed on every reset.
const SCRATCH_FILES: &[&str] = &[
    "temp.zip",
    "temp.jpg",
    "temp.jpeg",
    "temp.png",
    "temp_dataset.zip",
];

/// Scratch directories removed recursively on every reset.
const SCRATCH_DIRS: &[&str] = &["temp_dataset", "images"];

/// Stem of the single-image scratch file (`temp.<ext>`).
const SINGLE_UPLOAD_STEM: &str = "temp";

/// Archive scratch file for dataset uploads.
pub const ARCHIVE_FILE_NAME: &str = "temp_dataset.zip";

/// Staging directory an uploaded archive is unpacked into.
pub const STAGING_DIR_NAME: &str = "temp_dataset";

/// Flattened-images directory, nested inside the staging directory.
pub const FLATTENED_DIR_NAME: &str = "images";

/// Fixed scratch-path layout rooted at a caller-owned directory.
///
/// The relative names are contract surface shared with the UI layer; only
/// the root location is caller-configurable.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn archive_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_FILE_NAME)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR_NAME)
    }

    pub fn flattened_dir(&self) -> PathBuf {
        self.staging_dir().join(FLATTENED_DIR_NAME)
    }

    /// Path of the single-image scratch file for a given extension.
    pub fn single_upload_path(&self, extension: &str) -> PathBuf {
        self.root.join(format!(
            "{SINGLE_UPLOAD_STEM}.{}",
            extension.to_ascii_lowercase()
        ))
    }

    /// Wipe every scratch path. Idempotent: absent paths are skipped.
    ///
    /// Must run before any new upload is staged. Callers must not retain
    /// paths into the scratch locations across a reset.
    pub fn reset(&self) -> PipelineResult<()> {
        for name in SCRATCH_FILES {
            let path = self.root.join(name);
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    PipelineError::Io(format!("Failed to remove {}: {e}", path.display()))
                })?;
            }
        }

        for name in SCRATCH_DIRS {
            let path = self.root.join(name);
            if path.exists() {
                fs::remove_dir_all(&path).map_err(|e| {
                    PipelineError::Io(format!("Failed to remove {}: {e}", path.display()))
                })?;
            }
        }

        Ok(())
    }

    /// Stage a single uploaded image into the scratch file for its extension.
    ///
    /// Resets the workspace first, then writes the bytes verbatim. Uploads
    /// without a supported image extension are rejected before anything is
    /// written.
    pub fn stage_single_upload(&self, bytes: &[u8], file_name: &str) -> PipelineResult<PathBuf> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if !loader::IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(PipelineError::InvalidImage(format!(
                "Unsupported file type: {file_name}"
            )));
        }

        self.reset()?;

        fs::create_dir_all(&self.root)
            .map_err(|e| PipelineError::Io(format!("Failed to create workspace root: {e}")))?;

        let path = self.single_upload_path(&extension);
        fs::write(&path, bytes)
            .map_err(|e| PipelineError::Io(format!("Failed to write {}: {e}", path.display())))?;

        log::info!("Staged single upload to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
#[path = "tests/workspace_tests.rs"]
mod tests;
