//! Lenient field parsers for spreadsheet-originated cell values.
//!
//! Attendance files are human-edited; a malformed cell must never abort the
//! whole analysis. Every parser here degrades to zero / `None` instead of
//! erroring, and "no value" is itself a meaningful signal downstream (a zero
//! scheduled time means the lateness test cannot fire).

use chrono::{DateTime, NaiveDate};
use tracing::warn;

use crate::formatting::format_fixed2;
use crate::models::CellValue;

/// Days between the spreadsheet date-serial epoch (1899-12-30) and the Unix
/// epoch (1970-01-01).
const SERIAL_EPOCH_OFFSET_DAYS: f64 = 25569.0;

// ── Time of day ───────────────────────────────────────────────────────────────

/// Parse a time-of-day cell into minutes since midnight.
///
/// Accepted encodings:
/// * numeric fraction-of-day (spreadsheet native, `1.0` = 24h) →
///   `round(raw × 1440)`, floored at 0;
/// * `"HH:MM"` text — non-numeric parts default to 0, so `"8"` is 08:00 and
///   `"abc"` is 0;
/// * empty / `"-"` / `"0"` sentinels → 0.
///
/// Unparseable input degrades to 0 rather than erroring.
pub fn parse_time_of_day(raw: &CellValue) -> u32 {
    match raw {
        CellValue::Empty | CellValue::Bool(_) => 0,
        CellValue::Number(n) => {
            if !n.is_finite() || *n <= 0.0 {
                return 0;
            }
            (n * 1440.0).round() as u32
        }
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "-" || trimmed == "0" {
                return 0;
            }
            let mut parts = trimmed.split(':');
            let hours = parts.next().map(leading_uint).unwrap_or(0);
            let minutes = parts.next().map(leading_uint).unwrap_or(0);
            hours * 60 + minutes
        }
    }
}

/// Leading unsigned integer of `s` (after trimming), or 0.
///
/// Mirrors spreadsheet-tool coercion where `"8h"` reads as 8.
fn leading_uint(s: &str) -> u32 {
    let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

// ── Calendar date ─────────────────────────────────────────────────────────────

/// Parse a calendar-date cell.
///
/// * numeric → spreadsheet day-count serial, converted through the fixed
///   25569-day offset to the Unix epoch;
/// * text containing `/` → DAY/MONTH/YEAR;
/// * text containing `-` → YEAR-MONTH-DAY;
/// * anything else → a small set of generic date formats.
///
/// Returns `None` on failure; a row with no parseable date simply carries no
/// weekend information and falls through to the other working-day signals.
pub fn parse_calendar_date(raw: &CellValue) -> Option<NaiveDate> {
    match raw {
        CellValue::Empty | CellValue::Bool(_) => None,
        CellValue::Number(n) => {
            if !n.is_finite() {
                return None;
            }
            let millis = ((n - SERIAL_EPOCH_OFFSET_DAYS) * 86400.0 * 1000.0).round() as i64;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
        }
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            let parsed = if trimmed.contains('/') {
                parse_slash_date(trimmed)
            } else if trimmed.contains('-') {
                parse_dash_date(trimmed)
            } else {
                parse_generic_date(trimmed)
            };
            if parsed.is_none() {
                warn!("parse_calendar_date: could not parse date \"{}\"", trimmed);
            }
            parsed
        }
    }
}

/// DAY/MONTH/YEAR, e.g. `"15/08/2025"`.
fn parse_slash_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() < 3 {
        return None;
    }
    let day: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let year: i32 = parts[2].trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// YEAR-MONTH-DAY, e.g. `"2025-08-15"`.
fn parse_dash_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() < 3 {
        return None;
    }
    let year: i32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let day: u32 = parts[2].trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Fallback formats for dates that carry neither `/` nor `-`.
fn parse_generic_date(s: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &["%d %b %Y", "%d %B %Y", "%Y%m%d", "%B %d, %Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

// ── Durations and flags ───────────────────────────────────────────────────────

/// Convert a minute total into decimal hours with two-decimal rounding,
/// for display and reporting totals.
pub fn minutes_to_hours(minutes: u64) -> String {
    format_fixed2(minutes as f64 / 60.0)
}

/// Interpret a boolean-like flag cell.
///
/// Truthy encodings: JSON `true`, numeric `1`, textual `"true"` / `"1"`
/// (case-insensitive). Everything else, including a missing cell, is false.
pub fn is_flag_set(raw: &CellValue) -> bool {
    match raw {
        CellValue::Empty => false,
        CellValue::Bool(b) => *b,
        CellValue::Number(n) => *n == 1.0,
        CellValue::Text(s) => {
            let trimmed = s.trim();
            trimmed.eq_ignore_ascii_case("true") || trimmed == "1"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_time_of_day ─────────────────────────────────────────────────────

    #[test]
    fn test_time_hh_mm_text() {
        assert_eq!(parse_time_of_day(&CellValue::from("08:00")), 480);
        assert_eq!(parse_time_of_day(&CellValue::from("07:55")), 475);
        assert_eq!(parse_time_of_day(&CellValue::from("17:05")), 1025);
        assert_eq!(parse_time_of_day(&CellValue::from("9:5")), 545);
    }

    #[test]
    fn test_time_hours_only_text() {
        assert_eq!(parse_time_of_day(&CellValue::from("8")), 480);
    }

    #[test]
    fn test_time_fraction_of_day() {
        assert_eq!(parse_time_of_day(&CellValue::Number(0.5)), 720);
        // 08:00 as a fraction: 480/1440.
        assert_eq!(parse_time_of_day(&CellValue::Number(480.0 / 1440.0)), 480);
        // Rounding: 0.3333 * 1440 = 479.952.
        assert_eq!(parse_time_of_day(&CellValue::Number(0.3333)), 480);
    }

    #[test]
    fn test_time_sentinels() {
        assert_eq!(parse_time_of_day(&CellValue::Empty), 0);
        assert_eq!(parse_time_of_day(&CellValue::from("")), 0);
        assert_eq!(parse_time_of_day(&CellValue::from("-")), 0);
        assert_eq!(parse_time_of_day(&CellValue::from("0")), 0);
        assert_eq!(parse_time_of_day(&CellValue::Number(0.0)), 0);
    }

    #[test]
    fn test_time_malformed_degrades_to_zero() {
        assert_eq!(parse_time_of_day(&CellValue::from("abc")), 0);
        assert_eq!(parse_time_of_day(&CellValue::from(":30")), 30);
        assert_eq!(parse_time_of_day(&CellValue::Number(-0.25)), 0);
        assert_eq!(parse_time_of_day(&CellValue::Number(f64::NAN)), 0);
        assert_eq!(parse_time_of_day(&CellValue::Bool(true)), 0);
    }

    #[test]
    fn test_time_non_numeric_parts_default_to_zero() {
        // "8h:xx" → hours from leading digits, minutes unparseable → 0.
        assert_eq!(parse_time_of_day(&CellValue::from("8h:xx")), 480);
    }

    // ── parse_calendar_date ───────────────────────────────────────────────────

    #[test]
    fn test_date_slash_is_day_month_year() {
        let date = parse_calendar_date(&CellValue::from("15/08/2025")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 8, 15).unwrap());
    }

    #[test]
    fn test_date_dash_is_year_month_day() {
        let date = parse_calendar_date(&CellValue::from("2025-08-15")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 8, 15).unwrap());
    }

    #[test]
    fn test_date_serial_number() {
        // Serial 45292 is 2024-01-01.
        let date = parse_calendar_date(&CellValue::Number(45292.0)).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_date_generic_fallback() {
        let date = parse_calendar_date(&CellValue::from("15 Aug 2025")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 8, 15).unwrap());
    }

    #[test]
    fn test_date_invalid_returns_none() {
        assert!(parse_calendar_date(&CellValue::Empty).is_none());
        assert!(parse_calendar_date(&CellValue::from("")).is_none());
        assert!(parse_calendar_date(&CellValue::from("31/02/2026")).is_none());
        assert!(parse_calendar_date(&CellValue::from("not a date")).is_none());
        assert!(parse_calendar_date(&CellValue::from("1/2")).is_none());
        assert!(parse_calendar_date(&CellValue::Number(f64::NAN)).is_none());
    }

    // ── minutes_to_hours ──────────────────────────────────────────────────────

    #[test]
    fn test_minutes_to_hours() {
        assert_eq!(minutes_to_hours(90), "1.50");
        assert_eq!(minutes_to_hours(0), "0.00");
        assert_eq!(minutes_to_hours(45), "0.75");
        assert_eq!(minutes_to_hours(125), "2.08");
    }

    // ── is_flag_set ───────────────────────────────────────────────────────────

    #[test]
    fn test_flag_truthy_forms() {
        assert!(is_flag_set(&CellValue::Bool(true)));
        assert!(is_flag_set(&CellValue::Number(1.0)));
        assert!(is_flag_set(&CellValue::from("true")));
        assert!(is_flag_set(&CellValue::from("TRUE")));
        assert!(is_flag_set(&CellValue::from("1")));
    }

    #[test]
    fn test_flag_falsy_forms() {
        assert!(!is_flag_set(&CellValue::Empty));
        assert!(!is_flag_set(&CellValue::Bool(false)));
        assert!(!is_flag_set(&CellValue::Number(0.0)));
        assert!(!is_flag_set(&CellValue::from("false")));
        assert!(!is_flag_set(&CellValue::from("yes")));
        assert!(!is_flag_set(&CellValue::from("")));
    }
}
