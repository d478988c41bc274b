//! RunStats - replay run diagnostics
//!
//! Counters collected by a single filter run.

use serde::{Deserialize, Serialize};

/// Counters of one filter run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// First windowed inertial index
    pub k_start: usize,

    /// One past the last windowed inertial index
    pub k_end: usize,

    /// Inertial steps processed
    pub steps: u64,

    /// Steps during which at least one new fix was consumed
    pub new_fix_steps: u64,

    /// Inertial index at which `init` was called
    pub init_index: Option<usize>,

    /// Inertial timestamp at which `init` was called
    pub init_time: Option<f64>,

    /// Steps where the reference cursor was still behind the inertial clock
    /// after advancing
    pub reference_lag_steps: u64,

    /// Solutions appended to the recorder
    pub solutions: u64,
}

impl RunStats {
    /// Stats for a window covering `k_start..k_end`
    pub fn for_window(k_start: usize, k_end: usize) -> Self {
        Self {
            k_start,
            k_end,
            ..Default::default()
        }
    }

    /// Number of inertial samples inside the window
    pub fn window_len(&self) -> usize {
        self.k_end.saturating_sub(self.k_start)
    }

    /// Whether the filter ever produced a solution
    pub fn initialized(&self) -> bool {
        self.solutions > 0
    }
}
