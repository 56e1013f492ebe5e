#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Generic {0}")]
    Generic(String),

    #[error("No OCR documents (*.json) found in {0}")]
    NoDocuments(String),

    #[error("{failed} of {total} documents failed to render")]
    BatchFailed { failed: usize, total: usize },
}
