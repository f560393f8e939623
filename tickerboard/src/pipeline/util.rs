use std::collections::HashSet;

use tickerboard_core::{SourceSpec, TickerboardError};

/// Reject programmer errors before any I/O happens.
///
/// Rules:
/// - The subject must not be blank.
/// - Every source needs a non-blank name, unique within the run.
/// - Every request URL must be absolute http(s).
pub fn validate_specs(subject: &str, specs: &[SourceSpec]) -> Result<(), TickerboardError> {
    if subject.trim().is_empty() {
        return Err(TickerboardError::invalid_arg("subject cannot be empty"));
    }
    let mut seen: HashSet<&str> = HashSet::with_capacity(specs.len());
    for spec in specs {
        if spec.name.trim().is_empty() {
            return Err(TickerboardError::invalid_arg("source name cannot be empty"));
        }
        if !seen.insert(spec.name.as_str()) {
            return Err(TickerboardError::duplicate_source(spec.name.clone()));
        }
        spec.request.validate(&spec.name)?;
    }
    Ok(())
}
