//! Aggregation and rendering error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while aggregating a corpus or writing an artifact.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The requested chart kind is not one of the supported kinds.
    #[error("unsupported chart kind '{0}'")]
    UnsupportedKind(String),

    /// A chart run was configured without any chart kind.
    #[error("no chart kind requested")]
    NoKinds,

    /// A chart kind that plots tag values needed a number and got text.
    #[error("tag '{value}' is not numeric: {reason}")]
    Encoding { value: String, reason: String },

    /// An aggregate was handed to a chart kind that draws a different shape.
    #[error("chart kind '{kind}' cannot draw a {shape} aggregate")]
    ShapeMismatch { kind: String, shape: &'static str },

    /// The output artifact could not be created or written.
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chart option serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
