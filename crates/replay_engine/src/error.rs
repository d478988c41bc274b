//! Replay error types

use contracts::{ContractError, FilterError, FilterPhase};
use thiserror::Error;

/// Replay error
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Neither inertial nor fix samples: nothing can be replayed
    #[error("no inertial and no fix samples to replay")]
    InsufficientData,

    /// A stream goes back in time
    #[error("streams not replayable: {0}")]
    Streams(#[from] ContractError),

    /// A filter contract call returned an error
    #[error("filter '{filter}' failed during {phase}: {source}")]
    Filter {
        filter: String,
        phase: FilterPhase,
        #[source]
        source: FilterError,
    },

    /// A filter returned a solution with a negative or NaN covariance entry
    #[error(
        "filter '{filter}' returned invalid {field} covariance[{axis}] = {value} at t={timestamp} during {phase}"
    )]
    InvalidSolution {
        filter: String,
        phase: FilterPhase,
        timestamp: f64,
        field: &'static str,
        axis: usize,
        value: f64,
    },

    /// A filter that skips `init` needs at least one fix
    #[error("filter '{filter}' skips init but the log has no fix samples")]
    PreInitializedWithoutFix { filter: String },

    /// No constructor registered for a filter kind
    #[error("unknown filter kind '{kind}' for filter '{name}' (known: {known})")]
    UnknownFilterKind {
        name: String,
        kind: String,
        known: String,
    },

    /// The run thread panicked
    #[error("filter '{filter}' run panicked: {message}")]
    RunPanicked { filter: String, message: String },

    /// The run task was cancelled before completion
    #[error("filter '{filter}' run was cancelled")]
    RunCancelled { filter: String },
}

impl ReplayError {
    /// Create a contract failure error
    pub fn filter(filter: impl Into<String>, phase: FilterPhase, source: FilterError) -> Self {
        Self::Filter {
            filter: filter.into(),
            phase,
            source,
        }
    }

    /// Contract phase in which the error occurred, if it came from a filter call
    pub fn phase(&self) -> Option<FilterPhase> {
        match self {
            Self::Filter { phase, .. } | Self::InvalidSolution { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

/// Replay Result type alias
pub type Result<T> = std::result::Result<T, ReplayError>;
