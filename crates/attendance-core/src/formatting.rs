//! Two-decimal KPI formatting.
//!
//! Percentage KPIs travel as already-rounded strings; every consumer sees
//! the same digits, and the compliance blend is defined over the rounded
//! values rather than the raw ratios.

/// Format a non-negative value with exactly two decimal places.
///
/// Adds a tiny epsilon (half ULP at the target precision) before rounding to
/// avoid IEEE 754 binary-representation issues at exact midpoints, so
/// `format_fixed2(0.125 * 100.0)` behaves like decimal half-up rounding.
///
/// # Examples
///
/// ```
/// use attendance_core::formatting::format_fixed2;
///
/// assert_eq!(format_fixed2(0.0), "0.00");
/// assert_eq!(format_fixed2(87.5), "87.50");
/// assert_eq!(format_fixed2(100.0), "100.00");
/// ```
pub fn format_fixed2(value: f64) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    let epsilon = f64::EPSILON * abs_value * 100.0;
    let rounded = ((abs_value * 100.0) + epsilon).round() / 100.0;

    if negative && rounded != 0.0 {
        format!("-{:.2}", rounded)
    } else {
        format!("{:.2}", rounded)
    }
}

/// Percentage of `numerator` over `denominator` as a two-decimal string.
///
/// A zero denominator yields `"0.00"` — never a division error, never NaN.
///
/// # Examples
///
/// ```
/// use attendance_core::formatting::percent;
///
/// assert_eq!(percent(9, 10), "90.00");
/// assert_eq!(percent(1, 3), "33.33");
/// assert_eq!(percent(5, 0), "0.00");
/// ```
pub fn percent(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        return "0.00".to_string();
    }
    format_fixed2(numerator as f64 / denominator as f64 * 100.0)
}

/// Numeric value of a two-decimal rate string, 0.0 when unparseable.
pub fn rate_value(rate: &str) -> f64 {
    rate.parse().unwrap_or(0.0)
}
