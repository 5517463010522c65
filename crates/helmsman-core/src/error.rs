//! Core error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Release file not found: {path}")]
    ReleaseFileNotFound { path: PathBuf },

    #[error("Failed to parse release file: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid --set value '{value}': expected key=value")]
    InvalidSetValue { value: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A rendered document could not be parsed; the whole classification is rejected
    #[error("Malformed document #{index} in rendered manifest: {source}")]
    MalformedDocument {
        index: usize,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
