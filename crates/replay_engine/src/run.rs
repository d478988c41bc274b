//! Single filter run
//!
//! One pass over the windowed inertial sequence: advance the synchronizer,
//! step the lifecycle controller, record every solution.

use std::time::{Duration, Instant};

use contracts::{FilterConfig, FilterRunOptions, NavFilter, RunConfig, RunStats, SampleStreams};
use observability::{RunningStats, StatsSummary};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::{ReplayError, Result};
use crate::lifecycle::{FilterLifecycle, StepOutcome};
use crate::recorder::ResultRecorder;
use crate::synchronizer::StreamSynchronizer;
use crate::window::select_window;

/// Outcome of one successful filter run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Filter display name
    pub filter: String,

    /// Recorded solutions
    pub recorder: ResultRecorder,

    /// Run counters
    pub stats: RunStats,

    /// Wall-clock duration of the run
    pub elapsed: Duration,

    /// Latency of individual init/update calls (µs)
    pub call_latency_us: StatsSummary,
}

/// Replay `streams` through `filter`
///
/// The filter is closed exactly once before this function returns, whatever
/// the outcome, unless it was never touched (no replayable data, or
/// `skip_init` without fixes).
///
/// # Errors
/// - `InsufficientData` when there are neither inertial nor fix samples
/// - `PreInitializedWithoutFix` for `skip_init` on a log without fixes
/// - `Filter` / `InvalidSolution` when a contract call fails
#[instrument(
    name = "replay_run",
    skip_all,
    fields(filter = %filter.name(), skip_init = options.skip_init)
)]
pub fn run_filter(
    filter: &mut dyn NavFilter,
    streams: &SampleStreams,
    config: &RunConfig,
    filter_config: Option<&FilterConfig>,
    options: FilterRunOptions,
) -> Result<RunReport> {
    let name = filter.name().to_string();
    let result = replay(filter, &name, streams, config, filter_config, options);

    match &result {
        Ok(report) => {
            observability::record_run_metrics(&name, &report.stats, report.elapsed);
            info!(
                steps = report.stats.steps,
                solutions = report.stats.solutions,
                init_time = ?report.stats.init_time,
                elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
                "run complete"
            );
        }
        Err(e) => {
            let phase = e.phase().map(|p| p.to_string()).unwrap_or_else(|| "setup".to_string());
            observability::record_filter_failure(&name, &phase);
            warn!(error = %e, phase = %phase, "run failed");
        }
    }

    result
}

fn replay(
    filter: &mut dyn NavFilter,
    name: &str,
    streams: &SampleStreams,
    config: &RunConfig,
    filter_config: Option<&FilterConfig>,
    options: FilterRunOptions,
) -> Result<RunReport> {
    if !streams.is_replayable() {
        return Err(ReplayError::InsufficientData);
    }
    if options.skip_init && streams.fixes.is_empty() {
        return Err(ReplayError::PreInitializedWithoutFix {
            filter: name.to_string(),
        });
    }

    let started = Instant::now();
    let selection = select_window(&streams.inertial, &config.window);
    let mut stats = RunStats::for_window(selection.k_start, selection.k_end);
    let mut recorder = ResultRecorder::new();
    let mut latency = RunningStats::default();
    let mut sync =
        StreamSynchronizer::new(&streams.fixes, &streams.references, config.reference_advance);

    let mut lifecycle = if options.skip_init {
        FilterLifecycle::pre_initialized(filter)
    } else {
        FilterLifecycle::new(filter)
    };

    if let Some(filter_config) = filter_config {
        lifecycle.configure(filter_config)?;
    }

    for k in selection.range() {
        let inertial = &streams.inertial[k];
        let t = inertial.timestamp;

        let fix = sync.advance_fix(t);
        let reference = sync.advance_reference(t);

        if sync.is_reference_lagging(t) {
            if stats.reference_lag_steps == 0 {
                warn!(
                    t,
                    reference_index = sync.reference_index(),
                    "reference stream lags the inertial clock"
                );
            }
            stats.reference_lag_steps += 1;
        }

        stats.steps += 1;

        // No fix at all: the filter can never initialize
        let Some(fix) = fix else {
            continue;
        };
        if fix.is_new {
            stats.new_fix_steps += 1;
        }

        let call_started = Instant::now();
        let outcome = lifecycle.step(inertial, &fix, sync.fix_index(), reference)?;

        let solution = match outcome {
            StepOutcome::Waiting => continue,
            StepOutcome::Initialized(solution) => {
                stats.init_index = Some(k);
                stats.init_time = Some(t);
                info!(imu_time = t, fix_time = fix.timestamp, "filter initialized");
                solution
            }
            StepOutcome::Updated(solution) => solution,
        };

        let call_latency = call_started.elapsed();
        latency.push(call_latency.as_secs_f64() * 1e6);
        observability::record_step_latency(name, call_latency);

        recorder.append(&solution);
        stats.solutions += 1;
    }

    lifecycle.close()?;

    Ok(RunReport {
        filter: name.to_string(),
        recorder,
        stats,
        elapsed: started.elapsed(),
        call_latency_us: StatsSummary::from(&latency),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        FilterError, FilterPhase, FixSample, InertialSample, NavigationSolution, ReferenceAdvance,
        ReferenceSample, ReplayWindow,
    };

    #[derive(Default)]
    struct Recording {
        init_times: Vec<f64>,
        update_times: Vec<f64>,
        new_flags: Vec<bool>,
        close_calls: u32,
        configured: bool,
        fail_configure: bool,
        fail_update_at: Option<f64>,
        fail_close: bool,
    }

    impl NavFilter for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn configure(&mut self, _config: &FilterConfig) -> std::result::Result<(), FilterError> {
            self.configured = true;
            if self.fail_configure {
                return Err(FilterError::new("noise sigma out of range"));
            }
            Ok(())
        }

        fn init(
            &mut self,
            inertial: &InertialSample,
            fix: &FixSample,
            _reference: Option<&ReferenceSample>,
        ) -> std::result::Result<NavigationSolution, FilterError> {
            self.init_times.push(inertial.timestamp);
            self.new_flags.push(fix.is_new);
            Ok(NavigationSolution {
                timestamp: inertial.timestamp,
                ..Default::default()
            })
        }

        fn update(
            &mut self,
            inertial: &InertialSample,
            fix: &FixSample,
            _reference: Option<&ReferenceSample>,
        ) -> std::result::Result<NavigationSolution, FilterError> {
            if self.fail_update_at == Some(inertial.timestamp) {
                return Err(FilterError::new("singular covariance"));
            }
            self.update_times.push(inertial.timestamp);
            self.new_flags.push(fix.is_new);
            Ok(NavigationSolution {
                timestamp: inertial.timestamp,
                ..Default::default()
            })
        }

        fn close(&mut self) -> std::result::Result<(), FilterError> {
            self.close_calls += 1;
            if self.fail_close {
                return Err(FilterError::new("flush failed"));
            }
            Ok(())
        }
    }

    fn streams(imu_times: &[f64], fix_times: &[f64], ref_times: &[f64]) -> SampleStreams {
        SampleStreams::new(
            imu_times
                .iter()
                .map(|&t| InertialSample {
                    timestamp: t,
                    ..Default::default()
                })
                .collect(),
            fix_times
                .iter()
                .map(|&t| FixSample {
                    timestamp: t,
                    ..Default::default()
                })
                .collect(),
            ref_times
                .iter()
                .map(|&t| ReferenceSample {
                    timestamp: t,
                    ..Default::default()
                })
                .collect(),
        )
    }

    fn run(
        filter: &mut Recording,
        streams: &SampleStreams,
        config: &RunConfig,
    ) -> Result<RunReport> {
        run_filter(filter, streams, config, None, FilterRunOptions::default())
    }

    #[test]
    fn test_scenario_init_at_second_fix() {
        let streams = streams(&[0.0, 1.0, 2.0, 3.0], &[0.0, 2.0], &[]);
        let mut filter = Recording::default();
        let report = run(&mut filter, &streams, &RunConfig::default()).unwrap();

        assert_eq!(filter.init_times, vec![2.0]);
        assert_eq!(filter.update_times, vec![3.0]);
        assert_eq!(filter.new_flags, vec![true, false]);
        assert_eq!(filter.close_calls, 1);

        assert_eq!(report.recorder.times(), &[2.0, 3.0]);
        assert_eq!(report.stats.steps, 4);
        assert_eq!(report.stats.new_fix_steps, 1);
        assert_eq!(report.stats.init_index, Some(2));
        assert_eq!(report.stats.init_time, Some(2.0));
        assert_eq!(report.stats.solutions, 2);
        assert_eq!(report.filter, "recording");
    }

    #[test]
    fn test_empty_fix_stream_never_initializes() {
        let streams = streams(&[0.0, 1.0, 2.0], &[], &[]);
        let mut filter = Recording::default();
        let report = run(&mut filter, &streams, &RunConfig::default()).unwrap();

        assert!(report.recorder.is_empty());
        assert!(!report.stats.initialized());
        assert_eq!(report.stats.steps, 3);
        assert_eq!(filter.close_calls, 1);
    }

    #[test]
    fn test_single_fix_never_initializes() {
        let streams = streams(&[0.0, 1.0, 2.0], &[0.5], &[]);
        let mut filter = Recording::default();
        let report = run(&mut filter, &streams, &RunConfig::default()).unwrap();
        assert!(report.recorder.is_empty());
        assert_eq!(filter.close_calls, 1);
    }

    #[test]
    fn test_insufficient_data_is_fatal() {
        let streams = streams(&[], &[], &[1.0]);
        let mut filter = Recording::default();
        let err = run(&mut filter, &streams, &RunConfig::default()).unwrap_err();
        assert!(matches!(err, ReplayError::InsufficientData));
        assert_eq!(filter.close_calls, 0);
    }

    #[test]
    fn test_fixes_without_inertial_is_empty_run() {
        let streams = streams(&[], &[0.0, 1.0], &[]);
        let mut filter = Recording::default();
        let report = run(&mut filter, &streams, &RunConfig::default()).unwrap();
        assert_eq!(report.stats.steps, 0);
        assert_eq!(filter.close_calls, 1);
    }

    #[test]
    fn test_window_past_data_is_valid_empty_run() {
        let streams = streams(&[0.0, 1.0, 2.0], &[0.0, 1.0], &[]);
        let config = RunConfig {
            window: ReplayWindow::new(Some(100.0), None),
            ..Default::default()
        };
        let mut filter = Recording::default();
        let report = run(&mut filter, &streams, &config).unwrap();
        assert_eq!(report.stats.k_start, 3);
        assert_eq!(report.stats.steps, 0);
        assert!(report.recorder.is_empty());
        assert_eq!(filter.close_calls, 1);
    }

    #[test]
    fn test_window_keeps_fix_alignment() {
        // Fixes before the window are consumed on the first windowed step
        let streams = streams(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 0.5, 1.5, 3.5], &[]);
        let config = RunConfig {
            window: ReplayWindow::new(Some(2.0), Some(4.0)),
            ..Default::default()
        };
        let mut filter = Recording::default();
        let report = run(&mut filter, &streams, &config).unwrap();

        assert_eq!((report.stats.k_start, report.stats.k_end), (2, 4));
        assert_eq!(filter.init_times, vec![2.0]);
        assert_eq!(filter.update_times, vec![3.0]);
        assert_eq!(report.recorder.len(), 2);
    }

    #[test]
    fn test_update_failure_closes_once() {
        let streams = streams(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 1.0], &[]);
        let mut filter = Recording {
            fail_update_at: Some(3.0),
            ..Default::default()
        };
        let err = run(&mut filter, &streams, &RunConfig::default()).unwrap_err();

        assert_eq!(err.phase(), Some(FilterPhase::Update));
        assert_eq!(filter.update_times, vec![2.0]);
        assert_eq!(filter.close_calls, 1);
    }

    #[test]
    fn test_configure_failure_closes_once() {
        let streams = streams(&[0.0, 1.0, 2.0], &[0.0, 1.0], &[]);
        let mut filter = Recording {
            fail_configure: true,
            ..Default::default()
        };
        let err = run_filter(
            &mut filter,
            &streams,
            &RunConfig::default(),
            Some(&FilterConfig::default()),
            FilterRunOptions::default(),
        )
        .unwrap_err();

        assert_eq!(err.phase(), Some(FilterPhase::Configure));
        assert!(filter.configured);
        assert!(filter.init_times.is_empty());
        assert!(filter.update_times.is_empty());
        assert_eq!(filter.close_calls, 1);
    }

    #[test]
    fn test_close_failure_reported() {
        let streams = streams(&[0.0, 1.0], &[0.0, 1.0], &[]);
        let mut filter = Recording {
            fail_close: true,
            ..Default::default()
        };
        let err = run(&mut filter, &streams, &RunConfig::default()).unwrap_err();
        assert_eq!(err.phase(), Some(FilterPhase::Close));
        assert_eq!(filter.close_calls, 1);
    }

    #[test]
    fn test_skip_init_updates_from_first_step() {
        let streams = streams(&[0.0, 1.0, 2.0], &[0.0, 2.0], &[]);
        let mut filter = Recording::default();
        let options = FilterRunOptions { skip_init: true };
        let report = run_filter(
            &mut filter,
            &streams,
            &RunConfig::default(),
            Some(&FilterConfig::default()),
            options,
        )
        .unwrap();

        assert!(filter.configured);
        assert!(filter.init_times.is_empty());
        assert_eq!(filter.update_times, vec![0.0, 1.0, 2.0]);
        assert_eq!(report.recorder.len(), 3);
        assert_eq!(report.stats.init_index, None);
    }

    #[test]
    fn test_skip_init_without_fix_fails_upfront() {
        let streams = streams(&[0.0, 1.0], &[], &[]);
        let mut filter = Recording::default();
        let err = run_filter(
            &mut filter,
            &streams,
            &RunConfig::default(),
            None,
            FilterRunOptions { skip_init: true },
        )
        .unwrap_err();
        assert!(matches!(err, ReplayError::PreInitializedWithoutFix { .. }));
        assert!(filter.update_times.is_empty());
    }

    #[test]
    fn test_reference_lag_counted() {
        // 10 Hz reference against 1 Hz inertial: single-step lags
        let refs: Vec<f64> = (0..40).map(|i| i as f64 * 0.1).collect();
        let streams = streams(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0], &refs);

        let mut filter = Recording::default();
        let report = run(&mut filter, &streams, &RunConfig::default()).unwrap();
        assert_eq!(report.stats.reference_lag_steps, 3);

        let config = RunConfig {
            reference_advance: ReferenceAdvance::CatchUp,
            ..Default::default()
        };
        let mut filter = Recording::default();
        let report = run(&mut filter, &streams, &config).unwrap();
        assert_eq!(report.stats.reference_lag_steps, 0);
    }
}
