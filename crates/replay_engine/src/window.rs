//! Replay window selection
//!
//! Clips the inertial sequence to a requested time range. Out-of-range
//! windows never fail; they select an empty or partial range.

use std::ops::Range;

use contracts::{InertialSample, ReplayWindow};

/// Selected inertial indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSelection {
    /// First sample with `timestamp >= start` (len when start is past all data)
    pub k_start: usize,
    /// First sample with `timestamp >= end` (0 when end precedes all data)
    pub k_end: usize,
}

impl WindowSelection {
    /// Processed range `k_start..max(k_start, k_end)`
    pub fn range(&self) -> Range<usize> {
        self.k_start..self.k_end.max(self.k_start)
    }

    pub fn len(&self) -> usize {
        self.range().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Select the inertial indices covered by `window`
///
/// The sequence is assumed non-decreasing in time.
pub fn select_window(inertial: &[InertialSample], window: &ReplayWindow) -> WindowSelection {
    let k_start = window
        .start_s
        .map_or(0, |start| inertial.partition_point(|s| s.timestamp < start));
    let k_end = window
        .end_s
        .map_or(inertial.len(), |end| inertial.partition_point(|s| s.timestamp < end));

    WindowSelection { k_start, k_end }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(times: &[f64]) -> Vec<InertialSample> {
        times
            .iter()
            .map(|&t| InertialSample {
                timestamp: t,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_unset_window_covers_everything() {
        let imu = samples(&[0.0, 1.0, 2.0, 3.0]);
        let sel = select_window(&imu, &ReplayWindow::full());
        assert_eq!(sel.range(), 0..4);
    }

    #[test]
    fn test_bounds_inclusive_start_exclusive_end() {
        let imu = samples(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let sel = select_window(&imu, &ReplayWindow::new(Some(1.0), Some(3.0)));
        assert_eq!(sel, WindowSelection { k_start: 1, k_end: 3 });
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_bounds_between_samples() {
        let imu = samples(&[0.0, 1.0, 2.0, 3.0]);
        let sel = select_window(&imu, &ReplayWindow::new(Some(0.5), Some(2.5)));
        assert_eq!(sel.range(), 1..3);
    }

    #[test]
    fn test_start_after_all_data() {
        let imu = samples(&[0.0, 1.0, 2.0]);
        let sel = select_window(&imu, &ReplayWindow::new(Some(10.0), None));
        assert_eq!(sel.k_start, 3);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_end_before_all_data() {
        let imu = samples(&[5.0, 6.0]);
        let sel = select_window(&imu, &ReplayWindow::new(None, Some(1.0)));
        assert_eq!(sel.k_end, 0);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let imu = samples(&[0.0, 1.0, 2.0, 3.0]);
        let sel = select_window(&imu, &ReplayWindow::new(Some(2.0), Some(1.0)));
        assert_eq!(sel.range(), 2..2);
    }

    #[test]
    fn test_empty_sequence() {
        let sel = select_window(&[], &ReplayWindow::new(Some(1.0), Some(2.0)));
        assert_eq!(sel, WindowSelection { k_start: 0, k_end: 0 });
    }
}
