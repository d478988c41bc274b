//! Run configuration contracts shared across crates.

use serde::{Deserialize, Serialize};

/// Immutable configuration of a replay run, handed to the harness at
/// construction and shared by every filter run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Time window of inertial samples to replay
    #[serde(default)]
    pub window: ReplayWindow,

    /// Reference cursor advance policy
    #[serde(default)]
    pub reference_advance: ReferenceAdvance,

    /// How the harness schedules filter runs
    #[serde(default)]
    pub execution: ExecutionMode,
}

/// Requested `[start, end)` replay window (seconds). Unset bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayWindow {
    pub start_s: Option<f64>,
    pub end_s: Option<f64>,
}

impl ReplayWindow {
    /// Unbounded window: every inertial sample
    pub const fn full() -> Self {
        Self {
            start_s: None,
            end_s: None,
        }
    }

    pub const fn new(start_s: Option<f64>, end_s: Option<f64>) -> Self {
        Self { start_s, end_s }
    }
}

/// Reference cursor advance policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceAdvance {
    /// Advance at most one reference sample per inertial step. The cursor
    /// lags permanently when reference samples are denser than inertial
    /// steps; lag is counted in `RunStats::reference_lag_steps`.
    #[default]
    SingleStep,
    /// Advance until the reference sample is no longer older than the
    /// inertial step
    CatchUp,
}

/// Harness scheduling mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One filter after another, in registration order
    #[default]
    Sequential,
    /// All filters at once on the blocking pool
    Concurrent,
}

/// Per-filter run options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRunOptions {
    /// Treat the filter as already initialized: no `init` call, `update`
    /// from the first windowed step
    #[serde(default)]
    pub skip_init: bool,
}
