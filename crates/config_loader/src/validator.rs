//! Blueprint validation
//!
//! Rules:
//! - at least one filter
//! - filter names non-empty and unique, kinds non-empty
//! - filter tuning passes its field rules (sigmas and time constants > 0)
//! - window bounds finite and start <= end
//! - input path non-empty, fix cutoff finite

use std::collections::HashSet;

use contracts::{ContractError, RunBlueprint};
use validator::Validate;

/// Validate a RunBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RunBlueprint) -> Result<(), ContractError> {
    validate_input(blueprint)?;
    validate_window(blueprint)?;
    validate_filter_names(blueprint)?;
    validate_filter_configs(blueprint)?;
    Ok(())
}

fn validate_input(blueprint: &RunBlueprint) -> Result<(), ContractError> {
    if blueprint.input.path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "input.path",
            "input path cannot be empty",
        ));
    }
    if let Some(cutoff) = blueprint.input.fix_cutoff_s {
        if !cutoff.is_finite() {
            return Err(ContractError::config_validation(
                "input.fix_cutoff_s",
                format!("fix_cutoff_s must be finite, got {cutoff}"),
            ));
        }
    }
    Ok(())
}

fn validate_window(blueprint: &RunBlueprint) -> Result<(), ContractError> {
    let window = &blueprint.window;
    for (field, value) in [("window.start_s", window.start_s), ("window.end_s", window.end_s)] {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(ContractError::config_validation(
                    field,
                    format!("window bound must be finite, got {v}"),
                ));
            }
        }
    }

    if let (Some(start), Some(end)) = (window.start_s, window.end_s) {
        if start > end {
            return Err(ContractError::config_validation(
                "window.start_s / window.end_s",
                format!("start_s ({start}) must be <= end_s ({end})"),
            ));
        }
    }
    Ok(())
}

fn validate_filter_names(blueprint: &RunBlueprint) -> Result<(), ContractError> {
    if blueprint.filters.is_empty() {
        return Err(ContractError::config_validation(
            "filters",
            "at least one filter is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, filter) in blueprint.filters.iter().enumerate() {
        if filter.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("filters[{idx}].name"),
                "filter name cannot be empty",
            ));
        }
        if filter.kind.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("filters[{}].kind", filter.name),
                "filter kind cannot be empty",
            ));
        }
        if !seen.insert(filter.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("filters[name={}]", filter.name),
                "duplicate filter name",
            ));
        }
    }
    Ok(())
}

fn validate_filter_configs(blueprint: &RunBlueprint) -> Result<(), ContractError> {
    for filter in &blueprint.filters {
        let Some(config) = &filter.config else {
            continue;
        };
        if let Err(errors) = config.validate() {
            let mut fields: Vec<_> = errors.field_errors().keys().map(|k| k.to_string()).collect();
            fields.sort();
            return Err(ContractError::config_validation(
                format!("filters[{}].config", filter.name),
                format!("values must be > 0: {}", fields.join(", ")),
            ));
        }
    }
    Ok(())
}
