//! RunBlueprint - Config Loader output
//!
//! Describes a complete replay: where the log lives, which window to replay,
//! how streams are aligned, and which filters to compare.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{
    ExecutionMode, FilterConfig, FilterRunOptions, ReferenceAdvance, ReplayWindow, RunConfig,
};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete replay blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Flight log input
    pub input: InputConfig,

    /// Replay window
    #[serde(default)]
    pub window: WindowConfig,

    /// Stream alignment settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Harness scheduling
    #[serde(default)]
    pub harness: HarnessConfig,

    /// Filters to compare, in order
    pub filters: Vec<FilterSpec>,
}

/// Flight log input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// JSON-lines sample log
    pub path: PathBuf,

    /// Drop fix samples after this time (s), emulating a fix outage
    #[serde(default)]
    pub fix_cutoff_s: Option<f64>,
}

/// Replay window (seconds)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default)]
    pub start_s: Option<f64>,

    #[serde(default)]
    pub end_s: Option<f64>,
}

/// Stream alignment settings
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Reference cursor policy
    #[serde(default)]
    pub reference_advance: ReferenceAdvance,
}

/// Harness scheduling
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub execution: ExecutionMode,
}

/// One filter entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Unique display name
    pub name: String,

    /// Registered filter kind (e.g. "hold_fix")
    pub kind: String,

    /// Skip the `init` call and update from the first step
    #[serde(default)]
    pub skip_init: bool,

    /// Tuning parameters passed through `configure`
    #[serde(default)]
    pub config: Option<FilterConfig>,
}

impl FilterSpec {
    pub fn run_options(&self) -> FilterRunOptions {
        FilterRunOptions {
            skip_init: self.skip_init,
        }
    }
}

impl RunBlueprint {
    /// Build the immutable run configuration handed to the harness
    pub fn to_run_config(&self) -> RunConfig {
        RunConfig {
            window: ReplayWindow::new(self.window.start_s, self.window.end_s),
            reference_advance: self.sync.reference_advance,
            execution: self.harness.execution,
        }
    }

    /// Find a filter entry by name
    pub fn filter(&self, name: &str) -> Option<&FilterSpec> {
        self.filters.iter().find(|f| f.name == name)
    }
}
