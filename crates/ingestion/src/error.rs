//! Ingestion error types

use std::path::PathBuf;

use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Log file could not be opened
    #[error("failed to open log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A log line could not be parsed
    #[error("failed to parse log line {line}: {message}")]
    ParseFailed {
        /// 1-based line number
        line: usize,
        message: String,
    },

    /// A sample is older than the previous sample of the same stream
    #[error("{stream} sample on line {line} goes back in time: {timestamp} < {previous}")]
    OutOfOrder {
        stream: &'static str,
        line: usize,
        timestamp: f64,
        previous: f64,
    },

    /// Synthetic flight parameters are unusable
    #[error("invalid mock flight config: {0}")]
    InvalidMock(String),

    /// Log serialization failure
    #[error("failed to serialize sample: {0}")]
    Serialize(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
