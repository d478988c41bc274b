//! # Integration Tests
//!
//! End-to-end tests across crates.
//!
//! Covers:
//! - Contract snapshot checks
//! - Mock flight → JSON-lines log → loader → harness
//! - Run file → blueprint → harness
//! - Sequential and concurrent harness agreement

#[cfg(test)]
mod contract_tests {
    use contracts::{ExecutionMode, ReferenceAdvance, RunConfig};

    #[test]
    fn test_contract_defaults() {
        let _ = contracts::ConfigVersion::V1;
        let config = RunConfig::default();
        assert_eq!(config.reference_advance, ReferenceAdvance::SingleStep);
        assert_eq!(config.execution, ExecutionMode::Sequential);
        assert_eq!(config.window.start_s, None);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs::File;
    use std::io::BufWriter;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use config_loader::ConfigLoader;
    use contracts::{
        ExecutionMode, FilterError, FixSample, InertialSample, NavFilter, NavigationSolution,
        ReferenceSample, RunConfig, SampleStreams,
    };
    use ingestion::{write_jsonl, JsonlLoader, LogLoader, MockFlight, MockFlightConfig};
    use replay_engine::{filters, FilterEntry, Harness, ReplayError, Series};

    /// Counts close calls through a shared counter so it survives the harness
    struct CountingFilter {
        name: String,
        closes: Arc<AtomicU32>,
        fail_update_after: Option<f64>,
    }

    impl CountingFilter {
        fn new(name: &str, closes: Arc<AtomicU32>) -> Self {
            Self {
                name: name.to_string(),
                closes,
                fail_update_after: None,
            }
        }
    }

    impl NavFilter for CountingFilter {
        fn name(&self) -> &str {
            &self.name
        }

        fn init(
            &mut self,
            inertial: &InertialSample,
            fix: &FixSample,
            _reference: Option<&ReferenceSample>,
        ) -> Result<NavigationSolution, FilterError> {
            Ok(NavigationSolution {
                timestamp: inertial.timestamp,
                position: fix.position,
                ..Default::default()
            })
        }

        fn update(
            &mut self,
            inertial: &InertialSample,
            fix: &FixSample,
            _reference: Option<&ReferenceSample>,
        ) -> Result<NavigationSolution, FilterError> {
            if let Some(limit) = self.fail_update_after {
                if inertial.timestamp > limit {
                    return Err(FilterError::new("diverged"));
                }
            }
            Ok(NavigationSolution {
                timestamp: inertial.timestamp,
                position: fix.position,
                ..Default::default()
            })
        }

        fn close(&mut self) -> Result<(), FilterError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn mock_streams(duration_s: f64) -> SampleStreams {
        MockFlight::new(MockFlightConfig {
            duration_s,
            ..Default::default()
        })
        .generate()
        .unwrap()
    }

    fn hold_fix_harness(config: RunConfig, names: &[&str]) -> Harness {
        let mut harness = Harness::new(config);
        for name in names {
            harness.register(filters::create_filter(name, "hold_fix").unwrap());
        }
        harness
    }

    /// Mock flight → JSON-lines file → JsonlLoader → Harness
    #[test]
    fn test_e2e_mock_log_round_trip() {
        let streams = mock_streams(5.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flight.jsonl");
        write_jsonl(&streams, BufWriter::new(File::create(&path).unwrap())).unwrap();

        let loaded = JsonlLoader::new(&path).load().unwrap();
        assert_eq!(loaded.inertial.len(), streams.inertial.len());
        assert_eq!(loaded.fixes.len(), streams.fixes.len());
        assert_eq!(loaded.references.len(), streams.references.len());

        let report = hold_fix_harness(RunConfig::default(), &["baseline"])
            .run(&loaded)
            .unwrap();
        let run = report.get("baseline").unwrap().report().unwrap();

        // Initialized on the second fix, then one solution per inertial step
        assert!(run.stats.initialized());
        assert_eq!(run.stats.steps as usize, loaded.inertial.len());
        assert_eq!(run.recorder.len() as u64, run.stats.solutions);
        assert_eq!(
            run.stats.solutions as usize,
            loaded.inertial.len() - run.stats.init_index.unwrap()
        );
    }

    /// Run file → blueprint → harness over a log next to the run file
    #[test]
    fn test_e2e_config_to_harness() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("flight.jsonl");
        write_jsonl(&mock_streams(10.0), File::create(&log).unwrap()).unwrap();

        let config_path = dir.path().join("replay.toml");
        std::fs::write(
            &config_path,
            r#"
            [input]
            path = "flight.jsonl"
            fix_cutoff_s = 3.0

            [window]
            start_s = 2.0
            end_s = 4.0

            [sync]
            reference_advance = "catch_up"

            [[filters]]
            name = "baseline"
            kind = "hold_fix"

            [[filters]]
            name = "warm"
            kind = "hold_fix"
            skip_init = true

            [filters.config]
            fix_position_sigma_ne = 2.5
            "#,
        )
        .unwrap();

        let blueprint = ConfigLoader::load_from_path(&config_path).unwrap();
        assert_eq!(blueprint.input.path, log);

        let mut streams = JsonlLoader::new(&blueprint.input.path).load().unwrap();
        let removed = streams.apply_fix_cutoff(blueprint.input.fix_cutoff_s.unwrap());
        assert_eq!(removed, 35);

        let mut harness = Harness::new(blueprint.to_run_config());
        for spec in &blueprint.filters {
            let filter = filters::create_filter(&spec.name, &spec.kind).unwrap();
            let mut entry = FilterEntry::new(filter).with_options(spec.run_options());
            if let Some(config) = &spec.config {
                entry = entry.with_config(config.clone());
            }
            harness.register_entry(entry);
        }

        let report = harness.run(&streams).unwrap();
        assert!(report.all_succeeded());

        let baseline = report.get("baseline").unwrap().report().unwrap();
        assert_eq!(baseline.stats.window_len(), 200);
        assert_eq!(baseline.stats.reference_lag_steps, 0);
        // Fixes before the window already moved the cursor; init on the first step
        assert_eq!(baseline.stats.init_time, Some(2.0));

        let warm = report.get("warm").unwrap().report().unwrap();
        assert_eq!(warm.stats.init_index, None);
        assert_eq!(warm.stats.solutions, 200);

        // Configured position sigma, squared
        match warm.recorder.series_by_name("cov_position").unwrap() {
            Series::Triple(cov) => assert_eq!(cov[0], [6.25, 6.25, 100.0]),
            Series::Scalar(_) => panic!("covariance is a triple series"),
        }
        assert!(report.relative_speed("baseline", "warm").is_some());
    }

    /// The minimal scenario: init on the second fix, update on the next step
    #[test]
    fn test_e2e_minimal_scenario() {
        let streams = SampleStreams::new(
            [0.0, 1.0, 2.0, 3.0]
                .iter()
                .map(|&t| InertialSample {
                    timestamp: t,
                    ..Default::default()
                })
                .collect(),
            [0.0, 2.0]
                .iter()
                .map(|&t| FixSample {
                    timestamp: t,
                    ..Default::default()
                })
                .collect(),
            Vec::new(),
        );

        let closes = Arc::new(AtomicU32::new(0));
        let mut harness = Harness::new(RunConfig::default());
        harness.register(Box::new(CountingFilter::new("counting", Arc::clone(&closes))));

        let report = harness.run(&streams).unwrap();
        let run = report.get("counting").unwrap().report().unwrap();
        assert_eq!(run.recorder.times(), &[2.0, 3.0]);
        assert_eq!(run.stats.init_index, Some(2));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    /// Concurrent and sequential harnesses produce the same results
    #[tokio::test]
    async fn test_e2e_concurrent_matches_sequential() {
        let streams = Arc::new(mock_streams(8.0));
        let names = ["a", "b", "c"];

        let sequential = hold_fix_harness(RunConfig::default(), &names)
            .run(&streams)
            .unwrap();

        let config = RunConfig {
            execution: ExecutionMode::Concurrent,
            ..Default::default()
        };
        let concurrent = hold_fix_harness(config, &names)
            .execute(Arc::clone(&streams))
            .await
            .unwrap();

        let order: Vec<&str> = concurrent.runs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, names);

        for name in names {
            let seq = sequential.get(name).unwrap().report().unwrap();
            let con = concurrent.get(name).unwrap().report().unwrap();
            assert_eq!(seq.stats, con.stats);
            assert_eq!(seq.recorder, con.recorder);
        }
    }

    /// One diverging filter does not affect the others, and every filter is
    /// closed exactly once
    #[tokio::test]
    async fn test_e2e_failure_isolated() {
        let streams = Arc::new(mock_streams(4.0));
        let closes = Arc::new(AtomicU32::new(0));

        let mut failing = CountingFilter::new("failing", Arc::clone(&closes));
        failing.fail_update_after = Some(1.0);

        let config = RunConfig {
            execution: ExecutionMode::Concurrent,
            ..Default::default()
        };
        let mut harness = Harness::new(config);
        harness
            .register(Box::new(CountingFilter::new("first", Arc::clone(&closes))))
            .register(Box::new(failing))
            .register(Box::new(CountingFilter::new("last", Arc::clone(&closes))));

        let report = harness.execute(streams).await.unwrap();
        assert!(!report.all_succeeded());
        assert_eq!(report.successful().count(), 2);

        let (name, err) = report.failed().next().unwrap();
        assert_eq!(name, "failing");
        assert!(matches!(err, ReplayError::Filter { .. }));

        assert_eq!(closes.load(Ordering::SeqCst), 3);
    }

    /// A log with nothing to replay fails before any filter is touched
    #[test]
    fn test_e2e_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        std::fs::write(&path, "# no samples\n\n").unwrap();

        let streams = JsonlLoader::new(&path).load().unwrap();
        let closes = Arc::new(AtomicU32::new(0));
        let mut harness = Harness::new(RunConfig::default());
        harness.register(Box::new(CountingFilter::new("idle", Arc::clone(&closes))));

        assert!(matches!(
            harness.run(&streams),
            Err(ReplayError::InsufficientData)
        ));
        assert_eq!(closes.load(Ordering::SeqCst), 0);
    }
}
