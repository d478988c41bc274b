//! Synthetic flight generator
//!
//! Produces a deterministic constant-speed coordinated turn, sampled at
//! independent inertial / fix / reference rates. Used for demos and tests
//! without a recorded log.

use contracts::{
    Attitude, FixSample, GeodeticPosition, InertialSample, NedVelocity, ReferenceSample,
    SampleStreams, Vector3,
};
use tracing::{debug, instrument};

use crate::error::{IngestionError, Result};
use crate::loader::{record_loaded, LogLoader};

const GRAVITY: f64 = 9.80665;
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Synthetic flight parameters
#[derive(Debug, Clone, PartialEq)]
pub struct MockFlightConfig {
    /// First sample time (s)
    pub start_time_s: f64,

    /// Flight length (s)
    pub duration_s: f64,

    /// Inertial rate (Hz)
    pub imu_rate_hz: f64,

    /// Fix rate (Hz)
    pub fix_rate_hz: f64,

    /// Reference rate (Hz), 0 disables the reference stream
    pub reference_rate_hz: f64,

    /// Ground speed (m/s)
    pub speed_mps: f64,

    /// Heading rate (rad/s), 0 flies a straight line
    pub turn_rate_rps: f64,

    /// Start position (degrees, metres)
    pub origin: GeodeticPosition,
}

impl Default for MockFlightConfig {
    fn default() -> Self {
        Self {
            start_time_s: 0.0,
            duration_s: 60.0,
            imu_rate_hz: 100.0,
            fix_rate_hz: 5.0,
            reference_rate_hz: 50.0,
            speed_mps: 25.0,
            turn_rate_rps: 0.05,
            origin: GeodeticPosition {
                latitude: 47.397742,
                longitude: 8.545594,
                altitude: 488.0,
            },
        }
    }
}

/// Deterministic synthetic flight
#[derive(Debug, Clone, Default)]
pub struct MockFlight {
    config: MockFlightConfig,
}

/// Ground truth at one instant
struct TruthState {
    attitude: Attitude,
    position: GeodeticPosition,
    velocity: NedVelocity,
}

impl MockFlight {
    pub fn new(config: MockFlightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MockFlightConfig {
        &self.config
    }

    /// Generate the three streams
    pub fn generate(&self) -> Result<SampleStreams> {
        self.check()?;
        let c = &self.config;

        let inertial = sample_times(c.start_time_s, c.duration_s, c.imu_rate_hz)
            .map(|t| self.inertial_at(t))
            .collect();
        let fixes = sample_times(c.start_time_s, c.duration_s, c.fix_rate_hz)
            .map(|t| {
                let truth = self.truth_at(t);
                FixSample {
                    timestamp: t,
                    position: truth.position,
                    velocity: truth.velocity,
                    is_new: false,
                }
            })
            .collect();
        let references = if c.reference_rate_hz > 0.0 {
            sample_times(c.start_time_s, c.duration_s, c.reference_rate_hz)
                .map(|t| {
                    let truth = self.truth_at(t);
                    ReferenceSample {
                        timestamp: t,
                        attitude: truth.attitude,
                        position: truth.position,
                        velocity: truth.velocity,
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(SampleStreams::new(inertial, fixes, references))
    }

    fn check(&self) -> Result<()> {
        let c = &self.config;
        if !(c.start_time_s.is_finite() && c.duration_s.is_finite() && c.duration_s >= 0.0) {
            return Err(IngestionError::InvalidMock(format!(
                "start/duration must be finite and duration >= 0, got {} / {}",
                c.start_time_s, c.duration_s
            )));
        }
        for (name, rate) in [("imu_rate_hz", c.imu_rate_hz), ("fix_rate_hz", c.fix_rate_hz)] {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(IngestionError::InvalidMock(format!("{name} must be > 0, got {rate}")));
            }
        }
        if !(c.reference_rate_hz.is_finite() && c.reference_rate_hz >= 0.0) {
            return Err(IngestionError::InvalidMock(format!(
                "reference_rate_hz must be >= 0, got {}",
                c.reference_rate_hz
            )));
        }
        Ok(())
    }

    fn heading_at(&self, t: f64) -> f64 {
        self.config.turn_rate_rps * (t - self.config.start_time_s)
    }

    fn truth_at(&self, t: f64) -> TruthState {
        let c = &self.config;
        let elapsed = t - c.start_time_s;
        let yaw = self.heading_at(t);
        let omega = c.turn_rate_rps;

        // Distance travelled north/east along the arc
        let (north_m, east_m) = if omega.abs() < 1e-12 {
            (c.speed_mps * elapsed, 0.0)
        } else {
            let r = c.speed_mps / omega;
            (r * yaw.sin(), r * (1.0 - yaw.cos()))
        };

        let lat_rad = c.origin.latitude.to_radians();
        let latitude = c.origin.latitude + (north_m / EARTH_RADIUS_M).to_degrees();
        let longitude =
            c.origin.longitude + (east_m / (EARTH_RADIUS_M * lat_rad.cos())).to_degrees();

        // Coordinated turn bank angle
        let roll = (c.speed_mps * omega / GRAVITY).atan();

        TruthState {
            attitude: Attitude {
                roll,
                pitch: 0.0,
                yaw: wrap_angle(yaw),
            },
            position: GeodeticPosition {
                latitude,
                longitude,
                altitude: c.origin.altitude,
            },
            velocity: NedVelocity {
                north: c.speed_mps * yaw.cos(),
                east: c.speed_mps * yaw.sin(),
                down: 0.0,
            },
        }
    }

    fn inertial_at(&self, t: f64) -> InertialSample {
        let c = &self.config;
        let yaw = self.heading_at(t);
        let roll = (c.speed_mps * c.turn_rate_rps / GRAVITY).atan();
        let load = GRAVITY / roll.cos();

        InertialSample {
            timestamp: t,
            gyro: Vector3::new(0.0, c.turn_rate_rps * roll.sin(), c.turn_rate_rps * roll.cos()),
            accel: Vector3::new(0.0, 0.0, -load),
            mag: Vector3::new(0.21 * yaw.cos(), -0.21 * yaw.sin(), 0.43),
            temperature: 25.0,
        }
    }
}

impl LogLoader for MockFlight {
    fn describe(&self) -> String {
        format!(
            "mock:{}s@{}Hz/{}Hz/{}Hz",
            self.config.duration_s,
            self.config.imu_rate_hz,
            self.config.fix_rate_hz,
            self.config.reference_rate_hz
        )
    }

    #[instrument(name = "mock_flight_load", skip(self))]
    fn load(&self) -> Result<SampleStreams> {
        let streams = self.generate()?;
        record_loaded(&streams);
        debug!(
            inertial = streams.inertial.len(),
            fixes = streams.fixes.len(),
            references = streams.references.len(),
            "mock flight generated"
        );
        Ok(streams)
    }
}

/// `start + i / rate` for every `i` with the time inside `[start, start + duration]`
fn sample_times(start: f64, duration: f64, rate_hz: f64) -> impl Iterator<Item = f64> {
    // Small tolerance so the closing sample survives rounding
    let count = (duration * rate_hz + 1e-9).floor() as usize + 1;
    (0..count).map(move |i| start + i as f64 / rate_hz)
}

fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + std::f64::consts::PI).rem_euclid(std::f64::consts::TAU);
    wrapped - std::f64::consts::PI
}
