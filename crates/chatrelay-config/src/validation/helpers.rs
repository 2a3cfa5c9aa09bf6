//! Shared validation helpers.

use crate::schema::RateConfig;

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

pub(crate) fn validate_range_u64(
    errors: &mut Vec<String>,
    name: &str,
    value: u64,
    min: u64,
    max: u64,
) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

pub(crate) fn validate_non_empty(errors: &mut Vec<String>, name: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{name} must not be empty"));
    }
}

/// Rates must be finite and non-negative.
pub(crate) fn validate_rate(errors: &mut Vec<String>, name: &str, rate: &RateConfig) {
    for (field, value) in [
        ("input_per_1k", rate.input_per_1k),
        ("output_per_1k", rate.output_per_1k),
    ] {
        if !value.is_finite() || value < 0.0 {
            errors.push(format!("{name}.{field} = {value} must be a non-negative number"));
        }
    }
}
