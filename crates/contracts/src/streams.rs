//! SampleStreams - log loader output, replay input

use serde::{Deserialize, Serialize};

use crate::{ContractError, FixSample, InertialSample, ReferenceSample, Timestamped};

/// The three pre-loaded sequences of a flight log
///
/// Read-only during replay; wrap in `Arc` to share across concurrent runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStreams {
    pub inertial: Vec<InertialSample>,
    pub fixes: Vec<FixSample>,
    pub references: Vec<ReferenceSample>,
}

impl SampleStreams {
    pub fn new(
        inertial: Vec<InertialSample>,
        fixes: Vec<FixSample>,
        references: Vec<ReferenceSample>,
    ) -> Self {
        Self {
            inertial,
            fixes,
            references,
        }
    }

    /// Whether there is enough data for any run at all
    ///
    /// Only a log with neither inertial nor fix samples is unusable; other
    /// gaps degrade to an empty result.
    pub fn is_replayable(&self) -> bool {
        !(self.inertial.is_empty() && self.fixes.is_empty())
    }

    /// Check that every stream is non-decreasing in time
    pub fn check_order(&self) -> Result<(), ContractError> {
        check_stream_order("inertial", &self.inertial)?;
        check_stream_order("fix", &self.fixes)?;
        check_stream_order("reference", &self.references)?;
        Ok(())
    }

    /// Drop fix samples stamped after `cutoff_s`, emulating a fix outage
    ///
    /// Returns the number of removed samples.
    pub fn apply_fix_cutoff(&mut self, cutoff_s: f64) -> usize {
        let keep = self.fixes.partition_point(|f| f.timestamp <= cutoff_s);
        let removed = self.fixes.len() - keep;
        self.fixes.truncate(keep);
        removed
    }

    /// First and last inertial timestamp
    pub fn inertial_span(&self) -> Option<(f64, f64)> {
        match (self.inertial.first(), self.inertial.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }
}

/// Check a single stream for decreasing timestamps
pub fn check_stream_order<T: Timestamped>(
    stream: &str,
    samples: &[T],
) -> Result<(), ContractError> {
    for (index, pair) in samples.windows(2).enumerate() {
        let (previous, timestamp) = (pair[0].timestamp(), pair[1].timestamp());
        if timestamp < previous {
            return Err(ContractError::StreamOrder {
                stream: stream.to_string(),
                index: index + 1,
                timestamp,
                previous,
            });
        }
    }
    Ok(())
}
