//! NavigationSolution - filter contract output

use serde::{Deserialize, Serialize};

use crate::{Attitude, GeodeticPosition, NedVelocity, Vector3};

/// Covariance diagonals of the estimated states
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CovarianceDiagonals {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub attitude: [f64; 3],
    pub accel_bias: [f64; 3],
    pub gyro_bias: [f64; 3],
}

impl CovarianceDiagonals {
    /// Triples in a fixed order, paired with their name
    pub fn named(&self) -> [(&'static str, [f64; 3]); 5] {
        [
            ("position", self.position),
            ("velocity", self.velocity),
            ("attitude", self.attitude),
            ("accel_bias", self.accel_bias),
            ("gyro_bias", self.gyro_bias),
        ]
    }

    /// First entry that is negative or NaN, if any
    pub fn first_invalid(&self) -> Option<(&'static str, usize, f64)> {
        self.named().into_iter().find_map(|(name, triple)| {
            triple
                .iter()
                .position(|v| v.is_nan() || *v < 0.0)
                .map(|axis| (name, axis, triple[axis]))
        })
    }
}

/// One step of filter output
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationSolution {
    /// Solution time (seconds)
    pub timestamp: f64,

    pub attitude: Attitude,

    pub position: GeodeticPosition,

    pub velocity: NedVelocity,

    /// Estimated accelerometer bias (m/s²)
    pub accel_bias: Vector3,

    /// Estimated gyroscope bias (rad/s)
    pub gyro_bias: Vector3,

    pub covariance: CovarianceDiagonals,
}
