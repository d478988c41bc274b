//! Replay run metrics
//!
//! Publishes per-run statistics through the `metrics` facade and aggregates
//! them in memory for end-of-run summaries.

use std::time::Duration;

use contracts::RunStats;
use metrics::{counter, gauge, histogram};
use serde::Serialize;

/// Record the statistics of one completed filter run
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_run_metrics;
///
/// let report = run_filter(&mut filter, &streams, &config, options)?;
/// record_run_metrics(filter.name(), &report.stats, report.elapsed);
/// ```
pub fn record_run_metrics(filter: &str, stats: &RunStats, elapsed: Duration) {
    let filter = filter.to_string();

    counter!("replay_runs_total", "filter" => filter.clone()).increment(1);
    counter!("replay_steps_total", "filter" => filter.clone()).increment(stats.steps);
    counter!("replay_solutions_total", "filter" => filter.clone()).increment(stats.solutions);
    counter!("replay_new_fix_steps_total", "filter" => filter.clone())
        .increment(stats.new_fix_steps);

    if stats.reference_lag_steps > 0 {
        counter!("replay_reference_lag_steps_total", "filter" => filter.clone())
            .increment(stats.reference_lag_steps);
    }

    if let Some(index) = stats.init_index {
        gauge!("replay_init_index", "filter" => filter.clone()).set(index as f64);
    }

    histogram!("replay_run_seconds", "filter" => filter).record(elapsed.as_secs_f64());
}

/// Record a filter contract failure
pub fn record_filter_failure(filter: &str, phase: &str) {
    counter!(
        "replay_filter_failures_total",
        "filter" => filter.to_string(),
        "phase" => phase.to_string()
    )
    .increment(1);
}

/// Record the latency of a single init/update call
pub fn record_step_latency(filter: &str, latency: Duration) {
    histogram!("replay_filter_call_seconds", "filter" => filter.to_string())
        .record(latency.as_secs_f64());
}

/// Replay metrics aggregator
///
/// Aggregates run results in memory for a closing summary.
#[derive(Debug, Clone, Default)]
pub struct ReplayMetricsAggregator {
    /// Completed runs
    pub runs: u64,

    /// Failed runs
    pub failed: u64,

    /// Inertial steps over all completed runs
    pub total_steps: u64,

    /// Solutions over all completed runs
    pub total_solutions: u64,

    /// Runs that never initialized
    pub never_initialized: u64,

    /// Run wall-clock time (ms)
    pub run_ms: RunningStats,

    /// Failures per filter
    pub failures: Vec<String>,
}

impl ReplayMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a completed run
    pub fn update(&mut self, stats: &RunStats, elapsed: Duration) {
        self.runs += 1;
        self.total_steps += stats.steps;
        self.total_solutions += stats.solutions;
        if !stats.initialized() {
            self.never_initialized += 1;
        }
        self.run_ms.push(elapsed.as_secs_f64() * 1000.0);
    }

    /// Add a failed run
    pub fn record_failure(&mut self, filter: &str) {
        self.failed += 1;
        self.failures.push(filter.to_string());
    }

    /// Build the summary
    pub fn summary(&self) -> ReplaySummary {
        ReplaySummary {
            runs: self.runs,
            failed: self.failed,
            total_steps: self.total_steps,
            total_solutions: self.total_solutions,
            never_initialized: self.never_initialized,
            run_ms: StatsSummary::from(&self.run_ms),
            failed_filters: self.failures.clone(),
        }
    }
}

/// Replay summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplaySummary {
    pub runs: u64,
    pub failed: u64,
    pub total_steps: u64,
    pub total_solutions: u64,
    pub never_initialized: u64,
    pub run_ms: StatsSummary,
    pub failed_filters: Vec<String>,
}

impl std::fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Replay Summary ===")?;
        writeln!(f, "Completed runs: {}", self.runs)?;
        writeln!(f, "Failed runs: {}", self.failed)?;
        writeln!(f, "Steps processed: {}", self.total_steps)?;
        writeln!(f, "Solutions recorded: {}", self.total_solutions)?;
        if self.never_initialized > 0 {
            writeln!(f, "Runs never initialized: {}", self.never_initialized)?;
        }
        writeln!(f, "Run time (ms): {}", self.run_ms)?;

        if !self.failed_filters.is_empty() {
            writeln!(f, "Failed filters:")?;
            for name in &self.failed_filters {
                writeln!(f, "  {}", name)?;
            }
        }

        Ok(())
    }
}

/// Summary of a running statistic
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
