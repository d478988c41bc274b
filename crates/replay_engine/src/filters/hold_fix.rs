//! Hold-fix filter
//!
//! Reports the latest fix as the navigation solution. No estimation: biases
//! are zero and the covariance diagonals are the configured measurement
//! variances. Serves as a baseline and as a harness smoke test.

use contracts::{
    CovarianceDiagonals, FilterConfig, FilterError, FixSample, InertialSample, NavFilter,
    NavigationSolution, ReferenceSample, Vector3,
};
use tracing::debug;

pub struct HoldFixFilter {
    name: String,
    config: FilterConfig,
    updates: u64,
    closed: bool,
}

impl HoldFixFilter {
    pub const KIND: &'static str = "hold_fix";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: FilterConfig::default(),
            updates: 0,
            closed: false,
        }
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    fn covariance(&self) -> CovarianceDiagonals {
        let c = &self.config;
        let sq = |v: f64| v * v;
        CovarianceDiagonals {
            position: [
                sq(c.fix_position_sigma_ne),
                sq(c.fix_position_sigma_ne),
                sq(c.fix_position_sigma_d),
            ],
            velocity: [
                sq(c.fix_velocity_sigma_ne),
                sq(c.fix_velocity_sigma_ne),
                sq(c.fix_velocity_sigma_d),
            ],
            attitude: [sq(c.mag_sigma); 3],
            accel_bias: [sq(c.accel_bias_sigma); 3],
            gyro_bias: [sq(c.gyro_bias_sigma); 3],
        }
    }

    fn solve(
        &self,
        inertial: &InertialSample,
        fix: &FixSample,
    ) -> Result<NavigationSolution, FilterError> {
        if self.closed {
            return Err(FilterError::new(format!("filter '{}' is closed", self.name)));
        }
        Ok(NavigationSolution {
            timestamp: inertial.timestamp,
            attitude: Default::default(),
            position: fix.position,
            velocity: fix.velocity,
            accel_bias: Vector3::zero(),
            gyro_bias: Vector3::zero(),
            covariance: self.covariance(),
        })
    }
}

impl NavFilter for HoldFixFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&mut self, config: &FilterConfig) -> Result<(), FilterError> {
        self.config = config.clone();
        Ok(())
    }

    fn init(
        &mut self,
        inertial: &InertialSample,
        fix: &FixSample,
        _reference: Option<&ReferenceSample>,
    ) -> Result<NavigationSolution, FilterError> {
        debug!(filter = %self.name, t = inertial.timestamp, "hold_fix init");
        self.solve(inertial, fix)
    }

    fn update(
        &mut self,
        inertial: &InertialSample,
        fix: &FixSample,
        _reference: Option<&ReferenceSample>,
    ) -> Result<NavigationSolution, FilterError> {
        self.updates += 1;
        self.solve(inertial, fix)
    }

    fn close(&mut self) -> Result<(), FilterError> {
        if self.closed {
            return Err(FilterError::new(format!("filter '{}' closed twice", self.name)));
        }
        self.closed = true;
        debug!(filter = %self.name, updates = self.updates, "hold_fix closed");
        Ok(())
    }
}
