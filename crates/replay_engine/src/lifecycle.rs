//! Filter lifecycle controller
//!
//! Drives one filter through `Uninitialized -> Initialized -> Closed`.
//! The controller is a scoped guard: dropping it closes a filter that is
//! still open, so `close()` runs exactly once on every exit path.

use contracts::{
    FilterConfig, FilterPhase, FixSample, InertialSample, NavFilter, NavigationSolution,
    ReferenceSample,
};
use tracing::{debug, warn};

use crate::error::{ReplayError, Result};

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Closed,
}

/// Result of one inertial step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Still waiting for the first new fix, nothing to record
    Waiting,
    /// `init` was called on this step
    Initialized(NavigationSolution),
    /// `update` was called on this step
    Updated(NavigationSolution),
}

impl StepOutcome {
    pub fn solution(&self) -> Option<&NavigationSolution> {
        match self {
            StepOutcome::Waiting => None,
            StepOutcome::Initialized(s) | StepOutcome::Updated(s) => Some(s),
        }
    }
}

/// Scoped lifecycle guard around a borrowed filter
pub struct FilterLifecycle<'f> {
    filter: &'f mut dyn NavFilter,
    state: LifecycleState,
}

impl<'f> FilterLifecycle<'f> {
    /// Start in `Uninitialized`; `init` fires on the first step past fix 0
    pub fn new(filter: &'f mut dyn NavFilter) -> Self {
        Self {
            filter,
            state: LifecycleState::Uninitialized,
        }
    }

    /// Start in `Initialized`; every step calls `update`
    pub fn pre_initialized(filter: &'f mut dyn NavFilter) -> Self {
        Self {
            filter,
            state: LifecycleState::Initialized,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn filter_name(&self) -> &str {
        self.filter.name()
    }

    /// Pass tuning parameters to the filter
    pub fn configure(&mut self, config: &FilterConfig) -> Result<()> {
        self.filter
            .configure(config)
            .map_err(|e| self.fail(FilterPhase::Configure, e))
    }

    /// Run one inertial step
    ///
    /// `fix_index` is the synchronizer's fix cursor after advancing.
    pub fn step(
        &mut self,
        inertial: &InertialSample,
        fix: &FixSample,
        fix_index: usize,
        reference: Option<&ReferenceSample>,
    ) -> Result<StepOutcome> {
        match self.state {
            LifecycleState::Uninitialized if fix_index > 0 => {
                debug!(
                    filter = %self.filter.name(),
                    imu_time = inertial.timestamp,
                    fix_time = fix.timestamp,
                    "init"
                );
                let solution = self
                    .filter
                    .init(inertial, fix, reference)
                    .map_err(|e| self.fail(FilterPhase::Init, e))?;
                self.check_solution(FilterPhase::Init, &solution)?;
                self.state = LifecycleState::Initialized;
                Ok(StepOutcome::Initialized(solution))
            }
            LifecycleState::Uninitialized => Ok(StepOutcome::Waiting),
            LifecycleState::Initialized => {
                let solution = self
                    .filter
                    .update(inertial, fix, reference)
                    .map_err(|e| self.fail(FilterPhase::Update, e))?;
                self.check_solution(FilterPhase::Update, &solution)?;
                Ok(StepOutcome::Updated(solution))
            }
            LifecycleState::Closed => Ok(StepOutcome::Waiting),
        }
    }

    /// Close the filter. Terminal.
    pub fn close(mut self) -> Result<()> {
        self.state = LifecycleState::Closed;
        self.filter
            .close()
            .map_err(|e| ReplayError::filter(self.filter.name(), FilterPhase::Close, e))
    }

    fn fail(&self, phase: FilterPhase, source: contracts::FilterError) -> ReplayError {
        ReplayError::filter(self.filter.name(), phase, source)
    }

    fn check_solution(&self, phase: FilterPhase, solution: &NavigationSolution) -> Result<()> {
        match solution.covariance.first_invalid() {
            Some((field, axis, value)) => Err(ReplayError::InvalidSolution {
                filter: self.filter.name().to_string(),
                phase,
                timestamp: solution.timestamp,
                field,
                axis,
                value,
            }),
            None => Ok(()),
        }
    }
}

impl Drop for FilterLifecycle<'_> {
    fn drop(&mut self) {
        if self.state == LifecycleState::Closed {
            return;
        }
        self.state = LifecycleState::Closed;
        if let Err(e) = self.filter.close() {
            warn!(filter = %self.filter.name(), error = %e, "filter close failed during unwind");
        }
    }
}
