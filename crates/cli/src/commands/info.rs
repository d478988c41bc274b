//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{FilterConfig, RunBlueprint};
use serde::Serialize;
use tracing::info;

use super::run::format_bound;
use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    input: InputInfo,
    window: WindowInfo,
    reference_advance: String,
    execution: String,
    filters: Vec<FilterInfo>,
}

#[derive(Serialize)]
struct InputInfo {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix_cutoff_s: Option<f64>,
}

#[derive(Serialize)]
struct WindowInfo {
    start_s: Option<f64>,
    end_s: Option<f64>,
}

#[derive(Serialize)]
struct FilterInfo {
    name: String,
    kind: String,
    skip_init: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<FilterConfig>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &RunBlueprint, args: &InfoArgs) -> ConfigInfo {
    let filters = blueprint
        .filters
        .iter()
        .map(|f| FilterInfo {
            name: f.name.clone(),
            kind: f.kind.clone(),
            skip_init: f.skip_init,
            // Unset tuning means the filter's defaults apply
            config: args
                .filters
                .then(|| f.config.clone().unwrap_or_default()),
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        input: InputInfo {
            path: blueprint.input.path.display().to_string(),
            fix_cutoff_s: blueprint.input.fix_cutoff_s,
        },
        window: WindowInfo {
            start_s: blueprint.window.start_s,
            end_s: blueprint.window.end_s,
        },
        reference_advance: format!("{:?}", blueprint.sync.reference_advance),
        execution: format!("{:?}", blueprint.harness.execution),
        filters,
    }
}

fn print_config_info(blueprint: &RunBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Replay Run Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Input");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Log: {}", blueprint.input.path.display());
    match blueprint.input.fix_cutoff_s {
        Some(cutoff) => println!("   └─ Fix cutoff: {:.3}s", cutoff),
        None => println!("   └─ Fix cutoff: none"),
    }

    println!("\nWindow");
    println!("   ├─ Start: {}", format_bound(blueprint.window.start_s));
    println!("   └─ End: {}", format_bound(blueprint.window.end_s));

    println!("\nSettings");
    println!("   ├─ Reference advance: {:?}", blueprint.sync.reference_advance);
    println!("   └─ Execution: {:?}", blueprint.harness.execution);

    println!("\nFilters ({})", blueprint.filters.len());
    for (i, filter) in blueprint.filters.iter().enumerate() {
        let is_last = i == blueprint.filters.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        let init = if filter.skip_init { ", skip init" } else { "" };
        println!("   {} {} ({}{})", prefix, filter.name, filter.kind, init);

        if args.filters {
            let config = filter.config.clone().unwrap_or_default();
            let source = if filter.config.is_some() { "configured" } else { "defaults" };
            println!("   {}  └─ tuning ({}):", child_prefix, source);
            print_tuning(child_prefix, &config);
        }
    }

    println!();
}

fn print_tuning(child_prefix: &str, c: &FilterConfig) {
    let lines = [
        ("accel_noise_sigma", format!("{:?}", c.accel_noise_sigma)),
        ("gyro_noise_sigma", format!("{:?}", c.gyro_noise_sigma)),
        ("accel_bias", format!("sigma={} tau={}s", c.accel_bias_sigma, c.accel_bias_tau)),
        ("gyro_bias", format!("sigma={} tau={}s", c.gyro_bias_sigma, c.gyro_bias_tau)),
        (
            "fix_position_sigma",
            format!("ne={} d={}", c.fix_position_sigma_ne, c.fix_position_sigma_d),
        ),
        (
            "fix_velocity_sigma",
            format!("ne={} d={}", c.fix_velocity_sigma_ne, c.fix_velocity_sigma_d),
        ),
        ("mag_sigma", c.mag_sigma.to_string()),
    ];
    for (name, value) in lines {
        println!("   {}        {}: {}", child_prefix, name, value);
    }
}
