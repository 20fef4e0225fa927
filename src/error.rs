//! Error types for the gait classification pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Error type for gait classifier operations
#[derive(Error, Debug)]
pub enum GaitError {
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Recording file I/O error
    #[error("Recording error for {path}: {source}")]
    Recording {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed row in a recording file
    #[error("Recording format error at line {line}: {message}")]
    RecordingFormat { line: usize, message: String },
}

/// Result type for gait classifier operations
pub type Result<T> = std::result::Result<T, GaitError>;
