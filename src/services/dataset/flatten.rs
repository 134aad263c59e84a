//! Flattening deduplicator.
//!
//! Collects every image file from the arbitrarily nested staging tree into
//! one flat directory, resolving basename collisions with numeric suffixes.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::services::fs_utils::file_utils;
use crate::services::images::loader;
use crate::services::workspace::FLATTENED_DIR_NAME;
use crate::types::errors::{PipelineError, PipelineResult};

/// Move every image file found anywhere under `staging_dir` into the
/// nested flattened directory. Non-image files are left untouched.
///
/// Candidates are collected and sorted by full path before any move, so
/// collision resolution does not depend on OS walk order. Returns the
/// flattened directory path.
pub fn flatten_staging(staging_dir: &Path) -> PipelineResult<PathBuf> {
    let flattened_dir = staging_dir.join(FLATTENED_DIR_NAME);
    fs::create_dir_all(&flattened_dir)
        .map_err(|e| PipelineError::Io(format!("Failed to create flattened dir: {e}")))?;

    // The flattened directory lives inside the tree being drained; exclude
    // it so a run never picks up its own output.
    let mut candidates: Vec<PathBuf> = WalkDir::new(staging_dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.path() != flattened_dir)
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| loader::is_image_file(path))
        .collect();
    candidates.sort();

    let mut moved: usize = 0;
    for src_path in candidates {
        let Some(file_name) = src_path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("Skipping file with non-UTF-8 name: {}", src_path.display());
            continue;
        };

        let dst_path = dedup_destination(&flattened_dir, file_name);
        file_utils::move_file_cross_device(&src_path, &dst_path).map_err(|e| {
            PipelineError::Io(format!("Failed to move {}: {e}", src_path.display()))
        })?;
        moved += 1;
    }

    log::info!("Flattened {moved} images into {}", flattened_dir.display());
    Ok(flattened_dir)
}

/// First unused destination for `file_name` inside `flattened_dir`.
///
/// `x.jpg` stays `x.jpg` when free; otherwise `x_1.jpg`, `x_2.jpg`, …
fn dedup_destination(flattened_dir: &Path, file_name: &str) -> PathBuf {
    let safe_name = sanitize_filename::sanitize(file_name);
    let mut dst_path = flattened_dir.join(&safe_name);
    if !dst_path.exists() {
        return dst_path;
    }

    let (base, ext) = split_name(&safe_name);
    let mut counter = 1;
    while dst_path.exists() {
        dst_path = flattened_dir.join(format!("{base}_{counter}{ext}"));
        counter += 1;
    }
    dst_path
}

/// Split a file name at the final dot, keeping the dot with the extension.
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

#[cfg(test)]
#[path = "tests/flatten_tests.rs"]
mod tests;
