//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::RunBlueprint;
use replay_engine::filters;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    input: String,
    filter_count: usize,
    execution: String,
    reference_advance: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return invalid(config_path.clone(), CliError::config_not_found(config_path).to_string());
    }

    let blueprint = match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => blueprint,
        Err(e) => return invalid(config_path, e.to_string()),
    };

    if let Some(spec) = blueprint
        .filters
        .iter()
        .find(|f| !filters::is_known_kind(&f.kind))
    {
        let error = CliError::unknown_filter_kind(&spec.name, &spec.kind);
        return invalid(
            config_path,
            format!("{} (known: {})", error, filters::BUILTIN_KINDS.join(", ")),
        );
    }

    let warnings = collect_warnings(&blueprint);
    ValidationResult {
        valid: true,
        config_path,
        error: None,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
        summary: Some(ConfigSummary {
            version: format!("{:?}", blueprint.version),
            input: blueprint.input.path.display().to_string(),
            filter_count: blueprint.filters.len(),
            execution: format!("{:?}", blueprint.harness.execution),
            reference_advance: format!("{:?}", blueprint.sync.reference_advance),
        }),
    }
}

fn invalid(config_path: String, error: String) -> ValidationResult {
    ValidationResult {
        valid: false,
        config_path,
        error: Some(error),
        warnings: None,
        summary: None,
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &RunBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if !blueprint.input.path.exists() {
        warnings.push(format!(
            "Input log not found: {} (use --input or --mock when running)",
            blueprint.input.path.display()
        ));
    }

    if blueprint.filters.len() == 1 {
        warnings.push("Only one filter configured - no run-time comparison".to_string());
    }

    // Earlier fixes are still consumed on the first windowed step
    if let (Some(cutoff), Some(start)) = (blueprint.input.fix_cutoff_s, blueprint.window.start_s) {
        if cutoff < start {
            warnings.push(format!(
                "fix_cutoff_s ({cutoff}) is before window start ({start}) - \
                 fixes stop before the window opens"
            ));
        }
    }

    for filter in &blueprint.filters {
        if filter.skip_init && blueprint.input.fix_cutoff_s.is_some() {
            warnings.push(format!(
                "Filter '{}' skips init while fixes are cut off - it updates against held fixes",
                filter.name
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Input: {}", summary.input);
            println!("  Filters: {}", summary.filter_count);
            println!("  Execution: {}", summary.execution);
            println!("  Reference advance: {}", summary.reference_advance);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
