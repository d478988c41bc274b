//! Result recorder
//!
//! Columnar storage of the solutions of one run. Every field of a
//! `NavigationSolution` lives in its own insertion-ordered series, and all
//! series always have the same length.

use std::fmt;
use std::str::FromStr;

use contracts::NavigationSolution;
use serde::{Deserialize, Serialize};

/// Series names, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesName {
    Time,
    Roll,
    Pitch,
    Yaw,
    Latitude,
    Longitude,
    Altitude,
    VelNorth,
    VelEast,
    VelDown,
    AccelBiasX,
    AccelBiasY,
    AccelBiasZ,
    GyroBiasX,
    GyroBiasY,
    GyroBiasZ,
    CovPosition,
    CovVelocity,
    CovAttitude,
    CovAccelBias,
    CovGyroBias,
}

impl SeriesName {
    pub const ALL: [SeriesName; 21] = [
        SeriesName::Time,
        SeriesName::Roll,
        SeriesName::Pitch,
        SeriesName::Yaw,
        SeriesName::Latitude,
        SeriesName::Longitude,
        SeriesName::Altitude,
        SeriesName::VelNorth,
        SeriesName::VelEast,
        SeriesName::VelDown,
        SeriesName::AccelBiasX,
        SeriesName::AccelBiasY,
        SeriesName::AccelBiasZ,
        SeriesName::GyroBiasX,
        SeriesName::GyroBiasY,
        SeriesName::GyroBiasZ,
        SeriesName::CovPosition,
        SeriesName::CovVelocity,
        SeriesName::CovAttitude,
        SeriesName::CovAccelBias,
        SeriesName::CovGyroBias,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesName::Time => "time",
            SeriesName::Roll => "roll",
            SeriesName::Pitch => "pitch",
            SeriesName::Yaw => "yaw",
            SeriesName::Latitude => "latitude",
            SeriesName::Longitude => "longitude",
            SeriesName::Altitude => "altitude",
            SeriesName::VelNorth => "vel_north",
            SeriesName::VelEast => "vel_east",
            SeriesName::VelDown => "vel_down",
            SeriesName::AccelBiasX => "accel_bias_x",
            SeriesName::AccelBiasY => "accel_bias_y",
            SeriesName::AccelBiasZ => "accel_bias_z",
            SeriesName::GyroBiasX => "gyro_bias_x",
            SeriesName::GyroBiasY => "gyro_bias_y",
            SeriesName::GyroBiasZ => "gyro_bias_z",
            SeriesName::CovPosition => "cov_position",
            SeriesName::CovVelocity => "cov_velocity",
            SeriesName::CovAttitude => "cov_attitude",
            SeriesName::CovAccelBias => "cov_accel_bias",
            SeriesName::CovGyroBias => "cov_gyro_bias",
        }
    }
}

impl fmt::Display for SeriesName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesName {
    type Err = UnknownSeries;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeriesName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownSeries(s.to_string()))
    }
}

/// Unknown series name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown series '{0}'")]
pub struct UnknownSeries(pub String);

/// Borrowed view of one series
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Series<'a> {
    Scalar(&'a [f64]),
    Triple(&'a [[f64; 3]]),
}

impl Series<'_> {
    pub fn len(&self) -> usize {
        match self {
            Series::Scalar(v) => v.len(),
            Series::Triple(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Columnar solution store of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRecorder {
    time: Vec<f64>,
    roll: Vec<f64>,
    pitch: Vec<f64>,
    yaw: Vec<f64>,
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    altitude: Vec<f64>,
    vel_north: Vec<f64>,
    vel_east: Vec<f64>,
    vel_down: Vec<f64>,
    accel_bias_x: Vec<f64>,
    accel_bias_y: Vec<f64>,
    accel_bias_z: Vec<f64>,
    gyro_bias_x: Vec<f64>,
    gyro_bias_y: Vec<f64>,
    gyro_bias_z: Vec<f64>,
    cov_position: Vec<[f64; 3]>,
    cov_velocity: Vec<[f64; 3]>,
    cov_attitude: Vec<[f64; 3]>,
    cov_accel_bias: Vec<[f64; 3]>,
    cov_gyro_bias: Vec<[f64; 3]>,
}

impl ResultRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one solution to every series
    pub fn append(&mut self, solution: &NavigationSolution) {
        self.time.push(solution.timestamp);
        self.roll.push(solution.attitude.roll);
        self.pitch.push(solution.attitude.pitch);
        self.yaw.push(solution.attitude.yaw);
        self.latitude.push(solution.position.latitude);
        self.longitude.push(solution.position.longitude);
        self.altitude.push(solution.position.altitude);
        self.vel_north.push(solution.velocity.north);
        self.vel_east.push(solution.velocity.east);
        self.vel_down.push(solution.velocity.down);
        self.accel_bias_x.push(solution.accel_bias.x);
        self.accel_bias_y.push(solution.accel_bias.y);
        self.accel_bias_z.push(solution.accel_bias.z);
        self.gyro_bias_x.push(solution.gyro_bias.x);
        self.gyro_bias_y.push(solution.gyro_bias.y);
        self.gyro_bias_z.push(solution.gyro_bias.z);
        self.cov_position.push(solution.covariance.position);
        self.cov_velocity.push(solution.covariance.velocity);
        self.cov_attitude.push(solution.covariance.attitude);
        self.cov_accel_bias.push(solution.covariance.accel_bias);
        self.cov_gyro_bias.push(solution.covariance.gyro_bias);
    }

    /// Number of recorded solutions
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Timestamps of the recorded solutions
    pub fn times(&self) -> &[f64] {
        &self.time
    }

    pub fn series(&self, name: SeriesName) -> Series<'_> {
        match name {
            SeriesName::Time => Series::Scalar(&self.time),
            SeriesName::Roll => Series::Scalar(&self.roll),
            SeriesName::Pitch => Series::Scalar(&self.pitch),
            SeriesName::Yaw => Series::Scalar(&self.yaw),
            SeriesName::Latitude => Series::Scalar(&self.latitude),
            SeriesName::Longitude => Series::Scalar(&self.longitude),
            SeriesName::Altitude => Series::Scalar(&self.altitude),
            SeriesName::VelNorth => Series::Scalar(&self.vel_north),
            SeriesName::VelEast => Series::Scalar(&self.vel_east),
            SeriesName::VelDown => Series::Scalar(&self.vel_down),
            SeriesName::AccelBiasX => Series::Scalar(&self.accel_bias_x),
            SeriesName::AccelBiasY => Series::Scalar(&self.accel_bias_y),
            SeriesName::AccelBiasZ => Series::Scalar(&self.accel_bias_z),
            SeriesName::GyroBiasX => Series::Scalar(&self.gyro_bias_x),
            SeriesName::GyroBiasY => Series::Scalar(&self.gyro_bias_y),
            SeriesName::GyroBiasZ => Series::Scalar(&self.gyro_bias_z),
            SeriesName::CovPosition => Series::Triple(&self.cov_position),
            SeriesName::CovVelocity => Series::Triple(&self.cov_velocity),
            SeriesName::CovAttitude => Series::Triple(&self.cov_attitude),
            SeriesName::CovAccelBias => Series::Triple(&self.cov_accel_bias),
            SeriesName::CovGyroBias => Series::Triple(&self.cov_gyro_bias),
        }
    }

    /// Look up a series by its string name
    pub fn series_by_name(&self, name: &str) -> Result<Series<'_>, UnknownSeries> {
        name.parse().map(|name| self.series(name))
    }

    /// Every series with its name, in column order
    pub fn iter_series(&self) -> impl Iterator<Item = (SeriesName, Series<'_>)> + '_ {
        SeriesName::ALL.into_iter().map(move |name| (name, self.series(name)))
    }
}
