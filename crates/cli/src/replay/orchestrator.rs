//! Replay orchestrator - loads the log, builds the harness, runs it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{RunBlueprint, SampleStreams};
use ingestion::{JsonlLoader, LogLoader, MockFlight, MockFlightConfig};
use replay_engine::{filters, FilterEntry, Harness};
use tracing::{info, instrument};

use super::ReplayStats;
use crate::error::CliError;

/// Where the samples come from
#[derive(Debug, Clone)]
pub enum InputSource {
    /// JSON-lines flight log
    Log(PathBuf),
    /// Synthetic flight
    Mock(MockFlightConfig),
}

impl InputSource {
    fn loader(&self) -> Box<dyn LogLoader> {
        match self {
            InputSource::Log(path) => Box::new(JsonlLoader::new(path)),
            InputSource::Mock(config) => Box::new(MockFlight::new(config.clone())),
        }
    }
}

/// Everything needed for one replay
#[derive(Debug, Clone)]
pub struct ReplayJob {
    /// Validated run blueprint (CLI overrides applied)
    pub blueprint: RunBlueprint,

    /// Sample source
    pub source: InputSource,
}

/// Build a harness with one entry per configured filter
///
/// # Errors
/// Fails on the first filter whose kind is not registered.
pub fn build_harness(blueprint: &RunBlueprint) -> Result<Harness> {
    let mut harness = Harness::new(blueprint.to_run_config());

    for spec in &blueprint.filters {
        if !filters::is_known_kind(&spec.kind) {
            return Err(CliError::unknown_filter_kind(&spec.name, &spec.kind).into());
        }
        let filter = filters::create_filter(&spec.name, &spec.kind)?;

        let mut entry = FilterEntry::new(filter).with_options(spec.run_options());
        if let Some(config) = &spec.config {
            entry = entry.with_config(config.clone());
        }
        harness.register_entry(entry);
    }

    Ok(harness)
}

/// Load on the blocking pool so the caller's shutdown signal stays live
async fn load_streams(input: InputSource) -> Result<(String, SampleStreams)> {
    tokio::task::spawn_blocking(move || -> Result<(String, SampleStreams)> {
        let loader = input.loader();
        let source = loader.describe();
        info!(source = %source, "Loading flight log");

        let streams = loader
            .load()
            .with_context(|| format!("Failed to load samples from {source}"))?;
        Ok((source, streams))
    })
    .await
    .context("Log loading task failed")?
}

/// Replay orchestrator
pub struct Replay {
    job: ReplayJob,
}

impl Replay {
    pub fn new(job: ReplayJob) -> Self {
        Self { job }
    }

    /// Load, replay and summarize
    #[instrument(name = "replay", skip(self), fields(filters = self.job.blueprint.filters.len()))]
    pub async fn run(self) -> Result<ReplayStats> {
        let started = Instant::now();
        let blueprint = &self.job.blueprint;

        let (source, mut streams) = load_streams(self.job.source.clone()).await?;

        let fixes_removed = match blueprint.input.fix_cutoff_s {
            Some(cutoff) => {
                let removed = streams.apply_fix_cutoff(cutoff);
                info!(cutoff_s = cutoff, removed, "Fix outage applied");
                removed
            }
            None => 0,
        };

        if let Some((first, last)) = streams.inertial_span() {
            info!(
                inertial = streams.inertial.len(),
                fixes = streams.fixes.len(),
                references = streams.references.len(),
                span_s = last - first,
                "Samples loaded"
            );
        }

        let harness = build_harness(blueprint)?;
        let execution = harness.config().execution;
        let streams = Arc::new(streams);

        info!(?execution, filters = ?harness.filter_names(), "Starting replay");
        let report = harness
            .execute(Arc::clone(&streams))
            .await
            .context("Replay failed")?;

        Ok(ReplayStats::collect(
            source,
            &streams,
            fixes_removed,
            &report,
            started.elapsed(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{FilterSpec, InputConfig};

    fn blueprint(kinds: &[&str]) -> RunBlueprint {
        RunBlueprint {
            version: Default::default(),
            input: InputConfig {
                path: PathBuf::from("mock"),
                fix_cutoff_s: None,
            },
            window: Default::default(),
            sync: Default::default(),
            harness: Default::default(),
            filters: kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| FilterSpec {
                    name: format!("f{i}"),
                    kind: kind.to_string(),
                    skip_init: false,
                    config: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_build_harness_registers_in_order() {
        let harness = build_harness(&blueprint(&["hold_fix", "hold_fix"])).unwrap();
        assert_eq!(harness.filter_names(), vec!["f0", "f1"]);
    }

    #[test]
    fn test_build_harness_unknown_kind() {
        let err = build_harness(&blueprint(&["hold_fix", "ekf15"])).err().unwrap();
        assert!(err.to_string().contains("unknown kind 'ekf15'"));
    }

    #[tokio::test]
    async fn test_missing_log_reported() {
        let err = load_streams(InputSource::Log(PathBuf::from("/nonexistent/flight.jsonl")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load samples from jsonl:"));
    }

    #[tokio::test]
    async fn test_mock_replay() {
        let mut bp = blueprint(&["hold_fix", "hold_fix"]);
        bp.input.fix_cutoff_s = Some(5.0);
        let job = ReplayJob {
            blueprint: bp,
            source: InputSource::Mock(MockFlightConfig {
                duration_s: 10.0,
                ..Default::default()
            }),
        };

        let stats = Replay::new(job).run().await.unwrap();
        assert_eq!(stats.inertial_samples, 1001);
        assert_eq!(stats.fixes_removed, 25);
        assert_eq!(stats.runs.len(), 2);
        assert!(!stats.all_failed());
        assert_eq!(stats.comparisons.len(), 1);
    }
}
