use thiserror::Error;

/// Errors surfaced by the shell-facing API of the core crate.
///
/// The layout engine itself never fails on malformed token data; these
/// variants only cover loading a document or a configuration.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Invalid OCR document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
