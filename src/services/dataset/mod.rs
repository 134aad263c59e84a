//! Dataset ingestion: reset, archive staging, flattening, enumeration.

pub mod extract;
pub mod flatten;

use std::path::PathBuf;

use crate::services::images::loader;
use crate::services::workspace::Workspace;
use crate::types::errors::{PipelineError, PipelineResult};

/// Run the full ingestion pipeline for an uploaded dataset archive.
///
/// Returns the flattened image paths in canonical (sorted) order. Fails
/// with `InvalidArchive` for malformed uploads and `EmptyDataset` when no
/// qualifying image survives flattening; both abort the run before any
/// extraction call is made.
pub fn ingest_archive(workspace: &Workspace, archive_bytes: &[u8]) -> PipelineResult<Vec<PathBuf>> {
    workspace.reset()?;

    let staging_dir = extract::stage_archive(workspace, archive_bytes)?;
    let flattened_dir = flatten::flatten_staging(&staging_dir)?;

    let images = loader::list_images(&flattened_dir);
    if images.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }

    log::info!("Dataset ready: {} images", images.len());
    Ok(images)
}

#[cfg(test)]
#[path = "tests/ingest_tests.rs"]
mod tests;
