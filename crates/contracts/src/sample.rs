//! Replayed samples - log loader output
//!
//! The three independently-timestamped sequences fed into a replay run.

use serde::{Deserialize, Serialize};

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Components as `[x, y, z]`
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Euler attitude (rad)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Geodetic position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
    /// Altitude (m)
    pub altitude: f64,
}

/// North/East/Down velocity (m/s)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NedVelocity {
    pub north: f64,
    pub east: f64,
    pub down: f64,
}

/// Anything stamped with a log time
pub trait Timestamped {
    /// Log timestamp (seconds)
    fn timestamp(&self) -> f64;
}

/// High-rate inertial sample. Drives the replay clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InertialSample {
    /// Log timestamp (seconds)
    pub timestamp: f64,

    /// Angular rates p/q/r (rad/s)
    pub gyro: Vector3,

    /// Specific force (m/s²)
    pub accel: Vector3,

    /// Magnetometer
    pub mag: Vector3,

    /// Sensor temperature (°C)
    #[serde(default)]
    pub temperature: f64,
}

/// Low-rate absolute position/velocity fix
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FixSample {
    /// Log timestamp (seconds)
    pub timestamp: f64,

    pub position: GeodeticPosition,

    pub velocity: NedVelocity,

    /// Set by the stream synchronizer on the copy handed to a filter: true
    /// when at least one fix was consumed during the current inertial step.
    #[serde(skip)]
    pub is_new: bool,
}

/// Independently computed (onboard) solution, comparison only
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSample {
    /// Log timestamp (seconds)
    pub timestamp: f64,

    pub attitude: Attitude,

    pub position: GeodeticPosition,

    pub velocity: NedVelocity,
}

impl Timestamped for InertialSample {
    fn timestamp(&self) -> f64 {
        self.timestamp
    }
}

impl Timestamped for FixSample {
    fn timestamp(&self) -> f64 {
        self.timestamp
    }
}

impl Timestamped for ReferenceSample {
    fn timestamp(&self) -> f64 {
        self.timestamp
    }
}
