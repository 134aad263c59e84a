use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("The uploaded file is not a valid zip archive: {0}")]
    InvalidArchive(String),
    #[error("No valid images found in the uploaded dataset")]
    EmptyDataset,
    #[error("Invalid or corrupted image: {0}")]
    InvalidImage(String),
    #[error("Extraction failed: {0}")]
    ExtractionFailure(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(error: std::io::Error) -> Self {
        PipelineError::Io(error.to_string())
    }
}

impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
#[path = "tests/errors_tests.rs"]
mod tests;
