//! Batch orchestration over a flattened image set.

use std::path::{Path, PathBuf};

use crate::services::images::loader;
use crate::types::batch::{BatchProgress, BatchSummary, ExtractionRecord, ItemWarning};
use crate::types::errors::{PipelineError, PipelineResult};

use super::provider::StructuredExtractor;

/// Run extraction over every path in `image_paths`, in order.
///
/// Each item is attempted exactly once: a validation failure or an
/// extractor error demotes the item to a warning and the batch continues.
/// A single bad item never aborts the batch. No parallelism, no retries.
pub fn run_batch<F>(
    image_paths: &[PathBuf],
    extractor: &dyn StructuredExtractor,
    mut on_progress: F,
) -> BatchSummary
where
    F: FnMut(BatchProgress),
{
    let total = image_paths.len();
    let mut results = Vec::new();
    let mut warnings = Vec::new();

    for (index, path) in image_paths.iter().enumerate() {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        on_progress(BatchProgress {
            current: index + 1,
            total,
            file_name: file_name.clone(),
        });

        match extract_one(path, extractor) {
            Ok(markdown) => {
                results.push(ExtractionRecord {
                    image_path: path.to_string_lossy().to_string(),
                    markdown,
                });
            }
            Err(error) => {
                let message = error.to_string();
                log::warn!("Skipping {file_name}: {message}");
                warnings.push(ItemWarning {
                    image_path: path.to_string_lossy().to_string(),
                    message,
                });
            }
        }
    }

    BatchSummary {
        batch_id: uuid::Uuid::new_v4().to_string(),
        total,
        successful: results.len(),
        skipped: warnings.len(),
        results,
        warnings,
        completed_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// Validate and extract a single image.
///
/// Shared by the batch loop and the single-image upload mode; for the
/// latter the error is terminal rather than a warning.
pub fn extract_one(path: &Path, extractor: &dyn StructuredExtractor) -> PipelineResult<String> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    if loader::load_image(path).is_none() {
        return Err(PipelineError::InvalidImage(file_name));
    }

    extractor
        .extract_structured_data(path)
        .map_err(PipelineError::ExtractionFailure)
}

#[cfg(test)]
#[path = "tests/batch_tests.rs"]
mod tests;
