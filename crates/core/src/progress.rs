//! Achievement progress rules.
//!
//! Progress is a percentage in `[0, 100]` with two decimal places (the
//! column is `NUMERIC(5,2)`). A record is complete exactly when its progress
//! reaches [`COMPLETE_PERCENTAGE`].

use crate::error::CoreError;

pub const MIN_PERCENTAGE: f64 = 0.0;

/// Progress at or above which an achievement counts as completed.
pub const COMPLETE_PERCENTAGE: f64 = 100.0;

/// Round to two decimal places, the precision stored in the database.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Validate and normalise a progress percentage.
///
/// Returns the value rounded to two decimals.
pub fn validate_progress(percentage: f64) -> Result<f64, CoreError> {
    if !percentage.is_finite() {
        return Err(CoreError::Validation(
            "progress_percentage must be a finite number".to_string(),
        ));
    }
    if !(MIN_PERCENTAGE..=COMPLETE_PERCENTAGE).contains(&percentage) {
        return Err(CoreError::Validation(format!(
            "progress_percentage must be between {MIN_PERCENTAGE} and {COMPLETE_PERCENTAGE}, got {percentage}"
        )));
    }
    Ok(round2(percentage))
}

pub fn is_complete(percentage: f64) -> bool {
    percentage >= COMPLETE_PERCENTAGE
}

/// Share of `completed` over `total` as a percentage with two decimals.
/// Zero when the catalog is empty.
pub fn completion_percentage(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round2(completed as f64 / total as f64 * 100.0)
}
