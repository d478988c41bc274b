//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: the
//! replayed sample model, the navigation solution, the filter contract and
//! the run configuration. Business crates depend on this crate only; reverse
//! dependencies are prohibited.
//!
//! ## Time Model
//! - Every sample carries a log timestamp in seconds (`f64`)
//! - The inertial sequence is the master clock; fix and reference samples are
//!   aligned against it and never drive stepping themselves

mod blueprint;
mod error;
mod filter;
mod run_config;
mod sample;
mod solution;
mod stats;
mod streams;

pub use blueprint::*;
pub use error::*;
pub use filter::*;
pub use run_config::*;
pub use sample::*;
pub use solution::*;
pub use stats::*;
pub use streams::*;
