//! Archive staging: uploaded bytes → scratch zip → staging directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::services::workspace::Workspace;
use crate::types::errors::{PipelineError, PipelineResult};

/// Free-space headroom required beyond the archive's uncompressed size.
const DISK_SPACE_BUFFER: u64 = 50 * 1024 * 1024;

/// Write uploaded archive bytes verbatim to the scratch file and unpack
/// them into a fresh staging directory, preserving the archive's internal
/// structure.
///
/// Malformed input fails with `InvalidArchive` and leaves no staging
/// directory behind. Entries whose names would escape the staging
/// directory are skipped.
pub fn stage_archive(workspace: &Workspace, bytes: &[u8]) -> PipelineResult<PathBuf> {
    fs::create_dir_all(workspace.root())
        .map_err(|e| PipelineError::Io(format!("Failed to create workspace root: {e}")))?;

    let archive_path = workspace.archive_path();
    fs::write(&archive_path, bytes)
        .map_err(|e| PipelineError::Io(format!("Failed to write archive: {e}")))?;

    let file = fs::File::open(&archive_path)
        .map_err(|e| PipelineError::Io(format!("Failed to open archive: {e}")))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| PipelineError::InvalidArchive(e.to_string()))?;

    check_disk_space(workspace.root(), &mut archive)?;

    let staging_dir = workspace.staging_dir();
    fs::create_dir_all(&staging_dir)
        .map_err(|e| PipelineError::Io(format!("Failed to create staging dir: {e}")))?;

    match unpack_entries(&mut archive, &staging_dir) {
        Ok(count) => {
            log::info!("Extracted {count} files into {}", staging_dir.display());
            Ok(staging_dir)
        }
        Err(e) => {
            // Downstream steps must never observe partial content.
            let _ = fs::remove_dir_all(&staging_dir);
            Err(e)
        }
    }
}

fn unpack_entries(
    archive: &mut zip::ZipArchive<fs::File>,
    staging_dir: &Path,
) -> PipelineResult<usize> {
    let mut count: usize = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| {
            PipelineError::InvalidArchive(format!("Failed to read entry {i}: {e}"))
        })?;

        let entry_path = match entry.enclosed_name() {
            Some(p) => p.to_path_buf(),
            None => {
                log::warn!("Skipping archive entry with unsafe path: {}", entry.name());
                continue;
            }
        };

        let output_path = staging_dir.join(&entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&output_path)
                .map_err(|e| PipelineError::Io(format!("Failed to create dir: {e}")))?;
        } else {
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| PipelineError::Io(format!("Failed to create parent: {e}")))?;
            }
            let mut outfile = fs::File::create(&output_path)
                .map_err(|e| PipelineError::Io(format!("Failed to create file: {e}")))?;
            io::copy(&mut entry, &mut outfile)
                .map_err(|e| PipelineError::Io(format!("Failed to write file: {e}")))?;
            count += 1;
        }
    }
    Ok(count)
}

/// Require the archive's declared uncompressed size plus a buffer to fit
/// in the free space of the volume holding the workspace.
fn check_disk_space(
    search_root: &Path,
    archive: &mut zip::ZipArchive<fs::File>,
) -> PipelineResult<()> {
    let mut uncompressed_size: u64 = 0;
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i).map_err(|e| {
            PipelineError::InvalidArchive(format!("Failed to read entry {i}: {e}"))
        })?;
        uncompressed_size = uncompressed_size.saturating_add(entry.size());
    }
    let required_space = uncompressed_size + DISK_SPACE_BUFFER;

    let disks = sysinfo::Disks::new_with_refreshed_list();
    let search_path = search_root
        .canonicalize()
        .unwrap_or_else(|_| search_root.to_path_buf());

    let mut available_space = 0;
    let mut matched_len = 0;
    for disk in disks.list() {
        let mount = disk.mount_point();
        if search_path.starts_with(mount) {
            let mount_len = mount.as_os_str().len();
            if mount_len > matched_len {
                matched_len = mount_len;
                available_space = disk.available_space();
            }
        }
    }

    if matched_len > 0 && available_space < required_space {
        return Err(PipelineError::Io(format!(
            "Insufficient disk space. Requires {required_space} bytes, but only {available_space} bytes available."
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/extract_tests.rs"]
mod tests;
