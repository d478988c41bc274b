//! NavFilter trait - navigation filter contract
//!
//! Defines the abstract interface every filter variant implements, plus the
//! tuning parameters handed to it before a run.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::{FixSample, InertialSample, NavigationSolution, ReferenceSample};

/// Navigation filter contract
///
/// A run calls `configure` (optional) once, `init` once, `update` for every
/// following inertial step and `close` exactly once at the end.
pub trait NavFilter: Send {
    /// Filter name (display only)
    fn name(&self) -> &str;

    /// Apply tuning parameters before any step
    fn configure(&mut self, _config: &FilterConfig) -> Result<(), FilterError> {
        Ok(())
    }

    /// First call of a run
    ///
    /// # Errors
    /// Returns an error when the filter cannot produce a solution; the run is aborted
    fn init(
        &mut self,
        inertial: &InertialSample,
        fix: &FixSample,
        reference: Option<&ReferenceSample>,
    ) -> Result<NavigationSolution, FilterError>;

    /// Every call after `init`
    ///
    /// # Errors
    /// Returns an error when the filter cannot produce a solution; the run is aborted
    fn update(
        &mut self,
        inertial: &InertialSample,
        fix: &FixSample,
        reference: Option<&ReferenceSample>,
    ) -> Result<NavigationSolution, FilterError>;

    /// Release filter-held resources. Terminal.
    fn close(&mut self) -> Result<(), FilterError>;
}

/// Error raised by a filter implementation
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FilterError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FilterError {
    /// Create a filter error with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a filter error wrapping an underlying cause
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Contract call in which a filter failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPhase {
    Configure,
    Init,
    Update,
    Close,
}

impl fmt::Display for FilterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterPhase::Configure => "configure",
            FilterPhase::Init => "init",
            FilterPhase::Update => "update",
            FilterPhase::Close => "close",
        };
        f.write_str(s)
    }
}

/// Noise and time-constant tuning for a filter run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FilterConfig {
    /// Accelerometer white-noise sigma per axis
    #[validate(custom(function = "positive_triple"))]
    pub accel_noise_sigma: [f64; 3],

    /// Gyroscope white-noise sigma per axis
    #[validate(custom(function = "positive_triple"))]
    pub gyro_noise_sigma: [f64; 3],

    /// Accelerometer bias random-walk sigma
    #[validate(range(exclusive_min = 0.0))]
    pub accel_bias_sigma: f64,

    /// Accelerometer bias time constant (s)
    #[validate(range(exclusive_min = 0.0))]
    pub accel_bias_tau: f64,

    /// Gyroscope bias random-walk sigma
    #[validate(range(exclusive_min = 0.0))]
    pub gyro_bias_sigma: f64,

    /// Gyroscope bias time constant (s)
    #[validate(range(exclusive_min = 0.0))]
    pub gyro_bias_tau: f64,

    /// Fix position sigma, horizontal (m)
    #[validate(range(exclusive_min = 0.0))]
    pub fix_position_sigma_ne: f64,

    /// Fix position sigma, vertical (m)
    #[validate(range(exclusive_min = 0.0))]
    pub fix_position_sigma_d: f64,

    /// Fix velocity sigma, horizontal (m/s)
    #[validate(range(exclusive_min = 0.0))]
    pub fix_velocity_sigma_ne: f64,

    /// Fix velocity sigma, vertical (m/s)
    #[validate(range(exclusive_min = 0.0))]
    pub fix_velocity_sigma_d: f64,

    /// Magnetometer heading-aiding sigma
    #[validate(range(exclusive_min = 0.0))]
    pub mag_sigma: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            accel_noise_sigma: [0.02; 3],
            gyro_noise_sigma: [0.001; 3],
            accel_bias_sigma: 0.1,
            accel_bias_tau: 100.0,
            gyro_bias_sigma: 0.00873,
            gyro_bias_tau: 50.0,
            fix_position_sigma_ne: 5.0,
            fix_position_sigma_d: 10.0,
            fix_velocity_sigma_ne: 2.0,
            fix_velocity_sigma_d: 4.0,
            mag_sigma: 0.05,
        }
    }
}

fn positive_triple(value: &[f64; 3]) -> Result<(), ValidationError> {
    if value.iter().all(|v| *v > 0.0) {
        Ok(())
    } else {
        Err(ValidationError::new("positive_triple"))
    }
}
