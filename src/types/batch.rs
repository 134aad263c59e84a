use serde::Serialize;

/// One successfully processed image: source path plus the structured
/// markdown returned by the extraction provider.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRecord {
    pub image_path: String,
    pub markdown: String,
}

/// A skipped item with the human-readable reason.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemWarning {
    pub image_path: String,
    pub message: String,
}

/// Emitted before each item is attempted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub current: usize,
    pub total: usize,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Unique ID for this batch run.
    pub batch_id: String,
    pub total: usize,
    pub successful: usize,
    pub skipped: usize,
    /// Successful extractions, in traversal order.
    pub results: Vec<ExtractionRecord>,
    /// One entry per skipped item, in traversal order.
    pub warnings: Vec<ItemWarning>,
    /// RFC 3339 timestamp of batch completion.
    pub completed_at: String,
}

#[cfg(test)]
#[path = "tests/batch_tests.rs"]
mod tests;
