//! Comparison of a user metric against a population reference value

use serde::{Deserialize, Serialize};

/// Differences within this many percentage points read as "in line"
pub const NORM_TOLERANCE_POINTS: f64 = 5.0;

/// A user value next to its population norm, ready to render as two bars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormComparison {
    /// User share in whole percent, 0-100
    pub user_percent: u8,
    /// Population share in whole percent, 0-100
    pub norm_percent: u8,
    pub explanation: String,
}

/// Build a comparison for `label` (e.g. "Hot flashes").
///
/// Inputs are percentages; they are clamped to `[0, 100]` and rounded, and a
/// non-finite value is treated as 0.
pub fn compare_to_norm(label: &str, user_value: f64, norm_value: f64) -> NormComparison {
    let user_percent = to_percent(user_value);
    let norm_percent = to_percent(norm_value);
    let diff = i16::from(user_percent) - i16::from(norm_percent);

    let explanation = if f64::from(diff.abs()) <= NORM_TOLERANCE_POINTS {
        format!(
            "{label} at {user_percent}% of your entries is in line with the typical {norm_percent}%"
        )
    } else if diff > 0 {
        format!(
            "{label} at {user_percent}% of your entries is {} points above the typical {norm_percent}%",
            diff
        )
    } else {
        format!(
            "{label} at {user_percent}% of your entries is {} points below the typical {norm_percent}%",
            -diff
        )
    };

    NormComparison {
        user_percent,
        norm_percent,
        explanation,
    }
}

fn to_percent(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_above_norm() {
        let comparison = compare_to_norm("Hot flashes", 85.4, 75.0);
        assert_eq!(comparison.user_percent, 85);
        assert_eq!(comparison.norm_percent, 75);
        assert_eq!(
            comparison.explanation,
            "Hot flashes at 85% of your entries is 10 points above the typical 75%"
        );
    }

    #[test]
    fn test_below_norm() {
        let comparison = compare_to_norm("Sleep issues", 100.0 / 3.0, 60.0);
        assert_eq!(comparison.user_percent, 33);
        assert!(comparison.explanation.contains("27 points below"));
    }

    #[test]
    fn test_within_tolerance() {
        let comparison = compare_to_norm("Night sweats", 44.6, 40.0);
        assert_eq!(comparison.user_percent, 45);
        assert!(comparison.explanation.contains("in line with"));
    }

    #[test]
    fn test_values_are_clamped() {
        let comparison = compare_to_norm("Pain", 140.0, -3.0);
        assert_eq!(comparison.user_percent, 100);
        assert_eq!(comparison.norm_percent, 0);

        let comparison = compare_to_norm("Pain", f64::NAN, f64::INFINITY);
        assert_eq!(comparison.user_percent, 0);
        assert_eq!(comparison.norm_percent, 0);
    }
}
