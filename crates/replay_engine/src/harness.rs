//! Multi-filter harness
//!
//! Replays the same streams through every registered filter. Each run owns
//! its synchronizer, lifecycle guard and recorder; one filter failing never
//! affects another. Results come back in registration order.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use contracts::{
    ExecutionMode, FilterConfig, FilterRunOptions, NavFilter, RunConfig, SampleStreams,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::error::{ReplayError, Result};
use crate::run::{run_filter, RunReport};

/// A filter plus its per-run settings
pub struct FilterEntry {
    pub filter: Box<dyn NavFilter>,
    pub config: Option<FilterConfig>,
    pub options: FilterRunOptions,
}

impl FilterEntry {
    pub fn new(filter: Box<dyn NavFilter>) -> Self {
        Self {
            filter,
            config: None,
            options: FilterRunOptions::default(),
        }
    }

    pub fn with_config(mut self, config: FilterConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_options(mut self, options: FilterRunOptions) -> Self {
        self.options = options;
        self
    }

    fn run(mut self, streams: &SampleStreams, config: &RunConfig) -> FilterRunResult {
        let name = self.filter.name().to_string();
        let outcome = run_filter(
            self.filter.as_mut(),
            streams,
            config,
            self.config.as_ref(),
            self.options,
        );
        FilterRunResult { name, outcome }
    }
}

/// Result of one filter run
#[derive(Debug)]
pub struct FilterRunResult {
    pub name: String,
    pub outcome: Result<RunReport>,
}

impl FilterRunResult {
    pub fn report(&self) -> Option<&RunReport> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ReplayError> {
        self.outcome.as_ref().err()
    }
}

/// Results of every run, in registration order
#[derive(Debug, Default)]
pub struct HarnessReport {
    pub runs: Vec<FilterRunResult>,
}

impl HarnessReport {
    /// Look up a run by filter name
    pub fn get(&self, name: &str) -> Option<&FilterRunResult> {
        self.runs.iter().find(|r| r.name == name)
    }

    /// Successful runs
    pub fn successful(&self) -> impl Iterator<Item = &RunReport> {
        self.runs.iter().filter_map(FilterRunResult::report)
    }

    /// Failed runs with their error
    pub fn failed(&self) -> impl Iterator<Item = (&str, &ReplayError)> {
        self.runs
            .iter()
            .filter_map(|r| r.error().map(|e| (r.name.as_str(), e)))
    }

    pub fn all_succeeded(&self) -> bool {
        self.runs.iter().all(|r| r.outcome.is_ok())
    }

    /// Compare the wall-clock time of two successful runs
    ///
    /// `None` if either run is missing or failed.
    pub fn relative_speed(&self, baseline: &str, candidate: &str) -> Option<RelativeSpeed> {
        let base = self.get(baseline)?.report()?;
        let cand = self.get(candidate)?.report()?;
        Some(RelativeSpeed::new(
            baseline,
            base.elapsed,
            candidate,
            cand.elapsed,
        ))
    }
}

/// Run-time comparison of two filters
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeSpeed {
    pub baseline: String,
    pub baseline_elapsed: Duration,
    pub candidate: String,
    pub candidate_elapsed: Duration,
    /// `(baseline - candidate) / baseline`; positive when the candidate is faster
    pub fraction: f64,
}

impl RelativeSpeed {
    pub fn new(
        baseline: &str,
        baseline_elapsed: Duration,
        candidate: &str,
        candidate_elapsed: Duration,
    ) -> Self {
        let base = baseline_elapsed.as_secs_f64();
        let fraction = if base > 0.0 {
            (base - candidate_elapsed.as_secs_f64()) / base
        } else {
            0.0
        };
        Self {
            baseline: baseline.to_string(),
            baseline_elapsed,
            candidate: candidate.to_string(),
            candidate_elapsed,
            fraction,
        }
    }

    pub fn is_faster(&self) -> bool {
        self.fraction >= 0.0
    }
}

impl fmt::Display for RelativeSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (percent, word) = if self.is_faster() {
            (self.fraction * 100.0, "faster")
        } else {
            (-self.fraction * 100.0, "slower")
        };
        write!(
            f,
            "{} is {:.1}% {} than {}",
            self.candidate, percent, word, self.baseline
        )
    }
}

/// Multi-filter harness
pub struct Harness {
    config: RunConfig,
    entries: Vec<FilterEntry>,
}

impl Harness {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Register a filter with default settings
    pub fn register(&mut self, filter: Box<dyn NavFilter>) -> &mut Self {
        self.register_entry(FilterEntry::new(filter))
    }

    /// Register a filter with configuration and options
    pub fn register_entry(&mut self, entry: FilterEntry) -> &mut Self {
        debug!(filter = %entry.filter.name(), "filter registered");
        self.entries.push(entry);
        self
    }

    /// Registered filter names, in order
    pub fn filter_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.filter.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every filter, one after another, on the calling thread
    ///
    /// # Errors
    /// `InsufficientData` before any run when the streams hold neither
    /// inertial nor fix samples, `Streams` when a stream goes back in time.
    /// Per-filter failures are in the report.
    #[instrument(name = "harness_run", skip_all, fields(filters = self.entries.len()))]
    pub fn run(self, streams: &SampleStreams) -> Result<HarnessReport> {
        check_streams(streams)?;

        let config = self.config;
        let runs = self
            .entries
            .into_iter()
            .map(|entry| entry.run(streams, &config))
            .collect();

        let report = HarnessReport { runs };
        log_report(&report);
        Ok(report)
    }

    /// Run every filter at once on the blocking pool
    ///
    /// A panicking run is reported as a failed run.
    #[instrument(name = "harness_run_concurrent", skip_all, fields(filters = self.entries.len()))]
    pub async fn run_concurrent(self, streams: Arc<SampleStreams>) -> Result<HarnessReport> {
        check_streams(&streams)?;

        let config = Arc::new(self.config);
        let handles: Vec<_> = self
            .entries
            .into_iter()
            .map(|entry| spawn_run(entry, &streams, &config))
            .collect();

        let mut runs = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            runs.push(join_run(name, handle).await);
        }

        let report = HarnessReport { runs };
        log_report(&report);
        Ok(report)
    }

    /// Run every filter one after another on the blocking pool
    ///
    /// Same order and results as [`Harness::run`], but the async caller
    /// stays responsive between and during runs.
    #[instrument(name = "harness_run_sequential", skip_all, fields(filters = self.entries.len()))]
    pub async fn run_sequential(self, streams: Arc<SampleStreams>) -> Result<HarnessReport> {
        check_streams(&streams)?;

        let config = Arc::new(self.config);
        let mut runs = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            let (name, handle) = spawn_run(entry, &streams, &config);
            runs.push(join_run(name, handle).await);
        }

        let report = HarnessReport { runs };
        log_report(&report);
        Ok(report)
    }

    /// Run according to the configured execution mode
    pub async fn execute(self, streams: Arc<SampleStreams>) -> Result<HarnessReport> {
        match self.config.execution {
            ExecutionMode::Sequential => self.run_sequential(streams).await,
            ExecutionMode::Concurrent => self.run_concurrent(streams).await,
        }
    }
}

fn check_streams(streams: &SampleStreams) -> Result<()> {
    if !streams.is_replayable() {
        return Err(ReplayError::InsufficientData);
    }
    streams.check_order()?;
    Ok(())
}

fn spawn_run(
    entry: FilterEntry,
    streams: &Arc<SampleStreams>,
    config: &Arc<RunConfig>,
) -> (String, JoinHandle<FilterRunResult>) {
    let name = entry.filter.name().to_string();
    let streams = Arc::clone(streams);
    let config = Arc::clone(config);
    let handle = tokio::task::spawn_blocking(move || entry.run(&streams, &config));
    (name, handle)
}

/// Await a run task; a panic or cancellation becomes a failed run
async fn join_run(name: String, handle: JoinHandle<FilterRunResult>) -> FilterRunResult {
    match handle.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => FilterRunResult {
            outcome: Err(ReplayError::RunPanicked {
                filter: name.clone(),
                message: panic_message(e.into_panic()),
            }),
            name,
        },
        Err(_) => FilterRunResult {
            outcome: Err(ReplayError::RunCancelled {
                filter: name.clone(),
            }),
            name,
        },
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn log_report(report: &HarnessReport) {
    let failed = report.failed().count();
    info!(
        runs = report.runs.len(),
        succeeded = report.runs.len() - failed,
        failed,
        "harness finished"
    );
}
