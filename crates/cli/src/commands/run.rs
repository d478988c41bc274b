//! `run` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{ExecutionMode, FilterSpec, InputConfig, ReferenceAdvance, RunBlueprint};
use ingestion::MockFlightConfig;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::replay::{InputSource, Replay, ReplayJob};

/// Execute the `run` command
pub async fn run_replay(args: &RunArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args)?;
    apply_overrides(&mut blueprint, args);
    ConfigLoader::validate(&blueprint).context("Invalid run configuration")?;

    info!(
        input = %blueprint.input.path.display(),
        filters = blueprint.filters.len(),
        execution = ?blueprint.harness.execution,
        reference_advance = ?blueprint.sync.reference_advance,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let source = if args.mock {
        InputSource::Mock(MockFlightConfig {
            duration_s: args.mock_duration,
            ..Default::default()
        })
    } else {
        InputSource::Log(blueprint.input.path.clone())
    };

    let replay = Replay::new(ReplayJob { blueprint, source });
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting replay...");

    let stats = tokio::select! {
        result = replay.run() => result.context("Replay execution failed")?,
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping after the running filter");
            return Ok(());
        }
    };

    info!(
        runs = stats.runs.len(),
        failed = stats.summary.failed,
        duration_secs = stats.duration_s,
        "Replay completed"
    );

    if args.json {
        let json =
            serde_json::to_string_pretty(&stats).context("Failed to serialize replay stats")?;
        println!("{}", json);
    } else {
        stats.print_summary();
    }

    if stats.all_failed() {
        return Err(CliError::AllRunsFailed {
            count: stats.runs.len(),
        }
        .into());
    }

    Ok(())
}

/// Load the run file, or fall back to a single default filter for `--mock`
/// without a run file
fn load_blueprint(args: &RunArgs) -> Result<RunBlueprint> {
    if !args.config.exists() {
        if args.mock {
            info!(config = %args.config.display(), "No run file, using default mock blueprint");
            return Ok(default_mock_blueprint());
        }
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    info!(config = %args.config.display(), "Loading configuration");
    ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))
}

fn default_mock_blueprint() -> RunBlueprint {
    RunBlueprint {
        version: Default::default(),
        input: InputConfig {
            path: "mock".into(),
            fix_cutoff_s: None,
        },
        window: Default::default(),
        sync: Default::default(),
        harness: Default::default(),
        filters: vec![FilterSpec {
            name: "hold_fix".to_string(),
            kind: "hold_fix".to_string(),
            skip_init: false,
            config: None,
        }],
    }
}

/// Apply command-line overrides on top of the run file
fn apply_overrides(blueprint: &mut RunBlueprint, args: &RunArgs) {
    if let Some(ref input) = args.input {
        info!(input = %input.display(), "Overriding input from CLI");
        blueprint.input.path = input.clone();
    }
    if let Some(start) = args.start {
        info!(start_s = start, "Overriding window start from CLI");
        blueprint.window.start_s = Some(start);
    }
    if let Some(end) = args.end {
        info!(end_s = end, "Overriding window end from CLI");
        blueprint.window.end_s = Some(end);
    }
    if let Some(cutoff) = args.fix_cutoff {
        info!(cutoff_s = cutoff, "Overriding fix cutoff from CLI");
        blueprint.input.fix_cutoff_s = Some(cutoff);
    }
    if args.concurrent {
        blueprint.harness.execution = ExecutionMode::Concurrent;
    }
    if args.catch_up {
        blueprint.sync.reference_advance = ReferenceAdvance::CatchUp;
    }
}

/// Resolve on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never resolves.
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &RunBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Input: {}", blueprint.input.path.display());
    if let Some(cutoff) = blueprint.input.fix_cutoff_s {
        println!("  Fix cutoff: {:.3}s", cutoff);
    }
    println!(
        "Window: {} .. {}",
        format_bound(blueprint.window.start_s),
        format_bound(blueprint.window.end_s)
    );
    println!("Reference advance: {:?}", blueprint.sync.reference_advance);
    println!("Execution: {:?}", blueprint.harness.execution);
    println!("\nFilters ({}):", blueprint.filters.len());
    for filter in &blueprint.filters {
        let init = if filter.skip_init { " [skip init]" } else { "" };
        println!("  - {} ({}){}", filter.name, filter.kind, init);
    }
}

pub(crate) fn format_bound(bound: Option<f64>) -> String {
    bound.map_or_else(|| "open".to_string(), |b| format!("{:.3}s", b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn args(argv: &[&str]) -> RunArgs {
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            run: RunArgs,
        }
        let mut full = vec!["run"];
        full.extend_from_slice(argv);
        Wrapper::try_parse_from(full).unwrap().run
    }

    #[test]
    fn test_overrides_applied() {
        let mut bp = default_mock_blueprint();
        let args = args(&[
            "--input",
            "other.jsonl",
            "--start",
            "1.5",
            "--fix-cutoff",
            "20",
            "--concurrent",
            "--catch-up",
        ]);
        apply_overrides(&mut bp, &args);

        assert_eq!(bp.input.path, PathBuf::from("other.jsonl"));
        assert_eq!(bp.window.start_s, Some(1.5));
        assert_eq!(bp.window.end_s, None);
        assert_eq!(bp.input.fix_cutoff_s, Some(20.0));
        assert_eq!(bp.harness.execution, ExecutionMode::Concurrent);
        assert_eq!(bp.sync.reference_advance, ReferenceAdvance::CatchUp);
    }

    #[test]
    fn test_no_overrides_keeps_file_values() {
        let mut bp = default_mock_blueprint();
        bp.window.start_s = Some(3.0);
        apply_overrides(&mut bp, &args(&[]));
        assert_eq!(bp.window.start_s, Some(3.0));
        assert_eq!(bp.harness.execution, ExecutionMode::Sequential);
    }

    #[test]
    fn test_missing_config_without_mock() {
        let args = args(&["--config", "/nonexistent/replay.toml"]);
        let err = load_blueprint(&args).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_missing_config_with_mock_uses_default() {
        let args = args(&["--config", "/nonexistent/replay.toml", "--mock"]);
        let bp = load_blueprint(&args).unwrap();
        assert_eq!(bp.filters.len(), 1);
        assert!(ConfigLoader::validate(&bp).is_ok());
    }

    #[test]
    fn test_format_bound() {
        assert_eq!(format_bound(None), "open");
        assert_eq!(format_bound(Some(2.0)), "2.000s");
    }

    #[tokio::test]
    async fn test_dry_run_does_not_replay() {
        let args = args(&["--config", "/nonexistent/replay.toml", "--mock", "--dry-run"]);
        assert!(run_replay(&args).await.is_ok());
    }
}
