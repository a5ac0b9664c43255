use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or decoding rule inputs.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input path does not exist or cannot be read.
    #[error("cannot access input {}: {source}", path.display())]
    InputAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YARA parsing error: {0}")]
    Yara(String),

    #[error("base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ParseError>;
