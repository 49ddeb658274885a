//! Trend detection over ordered numeric series.
//!
//! Compares the mean of the first ⌈n/3⌉ values against the mean of the last
//! ⌈n/3⌉ values. Shared by the analyzer's per-service evolution and the
//! comparator's evolution report.

use crate::error::{PromptError, Result};
use crate::models::{TrendLabel, TrendSummary};

/// Percent-change band inside which a series counts as stable.
const STABLE_BAND_PCT: f64 = 5.0;

/// Classify an ordered series. Needs at least two values.
pub fn analyze_trend(values: &[f64]) -> Result<TrendSummary> {
    if values.len() < 2 {
        return Err(PromptError::InsufficientData(format!(
            "trend needs at least 2 values, got {}",
            values.len()
        )));
    }

    let third = values.len().div_ceil(3);
    let first_avg = mean(&values[..third]);
    let last_avg = mean(&values[values.len() - third..]);

    let percent_change = if first_avg.abs() < f64::EPSILON {
        if last_avg.abs() < f64::EPSILON {
            0.0
        } else {
            // Rise from zero: direction is meaningful, magnitude is not.
            100.0 * last_avg.signum()
        }
    } else {
        (last_avg - first_avg) / first_avg * 100.0
    };

    let label = if percent_change.abs() < STABLE_BAND_PCT {
        TrendLabel::Stable
    } else if percent_change > 0.0 {
        TrendLabel::Increasing
    } else {
        TrendLabel::Decreasing
    };

    Ok(TrendSummary {
        label,
        percent_change,
        first_avg,
        last_avg,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
