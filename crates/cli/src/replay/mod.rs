//! Replay orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{InputSource, Replay, ReplayJob};
pub use stats::ReplayStats;
