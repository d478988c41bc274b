//! Built-in filters
//!
//! Maps a configured `kind` to a filter constructor.

mod hold_fix;

pub use hold_fix::HoldFixFilter;

use contracts::NavFilter;
use tracing::instrument;

use crate::error::{ReplayError, Result};

/// Kinds accepted by [`create_filter`]
pub const BUILTIN_KINDS: &[&str] = &[HoldFixFilter::KIND];

/// Construct a registered filter
///
/// # Errors
/// `UnknownFilterKind` when `kind` is not registered
#[instrument(name = "create_filter", level = "debug")]
pub fn create_filter(name: &str, kind: &str) -> Result<Box<dyn NavFilter>> {
    match kind {
        HoldFixFilter::KIND => Ok(Box::new(HoldFixFilter::new(name))),
        _ => Err(ReplayError::UnknownFilterKind {
            name: name.to_string(),
            kind: kind.to_string(),
            known: BUILTIN_KINDS.join(", "),
        }),
    }
}

/// Whether `kind` is registered
pub fn is_known_kind(kind: &str) -> bool {
    BUILTIN_KINDS.contains(&kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_filter() {
        let filter = create_filter("baseline", "hold_fix").unwrap();
        assert_eq!(filter.name(), "baseline");
        assert!(is_known_kind("hold_fix"));
    }

    #[test]
    fn test_unknown_kind() {
        match create_filter("ekf", "ekf15") {
            Err(ReplayError::UnknownFilterKind { kind, known, .. }) => {
                assert_eq!(kind, "ekf15");
                assert!(known.contains("hold_fix"));
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("unexpected filter"),
        }
        assert!(!is_known_kind("ekf15"));
    }
}
