//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Run file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// A filter entry names a kind with no registered constructor
    #[error("Filter '{name}' has unknown kind '{kind}'")]
    UnknownFilterKind { name: String, kind: String },

    /// Every filter run failed
    #[error("All {count} filter runs failed")]
    AllRunsFailed { count: usize },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn unknown_filter_kind(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnknownFilterKind {
            name: name.into(),
            kind: kind.into(),
        }
    }
}
