//! # Replay Engine
//!
//! Offline multi-rate replay of flight logs through navigation filters.
//!
//! Responsibilities:
//! - Clip the inertial sequence to a replay window
//! - Align fix and reference samples against the inertial clock
//! - Drive each filter through init → update → close
//! - Record solutions into columnar series
//! - Run several filters over the same streams and compare them
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use replay_engine::{filters, Harness};
//! use contracts::{RunConfig, SampleStreams};
//!
//! # async fn demo(streams: SampleStreams) -> Result<(), replay_engine::ReplayError> {
//! let mut harness = Harness::new(RunConfig::default());
//! harness.register(filters::create_filter("baseline", "hold_fix")?);
//!
//! let report = harness.execute(Arc::new(streams)).await?;
//! for run in report.successful() {
//!     println!("{}: {} solutions", run.filter, run.recorder.len());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
pub mod filters;
mod harness;
mod lifecycle;
mod recorder;
mod run;
mod synchronizer;
mod window;

// Re-exports
pub use contracts::{
    ExecutionMode, FilterConfig, FilterRunOptions, NavFilter, ReferenceAdvance, ReplayWindow,
    RunConfig, RunStats, SampleStreams,
};
pub use error::{ReplayError, Result};
pub use harness::{FilterEntry, FilterRunResult, Harness, HarnessReport, RelativeSpeed};
pub use lifecycle::{FilterLifecycle, LifecycleState, StepOutcome};
pub use recorder::{ResultRecorder, Series, SeriesName, UnknownSeries};
pub use run::{run_filter, RunReport};
pub use synchronizer::StreamSynchronizer;
pub use window::{select_window, WindowSelection};
