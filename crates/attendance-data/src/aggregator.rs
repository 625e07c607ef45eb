//! Reduction of classified attendance rows into the KPI summary.
//!
//! One synchronous pass: filter the working-day universe, count presence and
//! lateness inside it, scan overtime and the leave breakdown over the full
//! collection, then derive the percentage KPIs and the radar axes.

use std::collections::HashSet;

use attendance_core::exceptions::LeaveCategory;
use attendance_core::formatting::{format_fixed2, percent, rate_value};
use attendance_core::models::{AnalyticsSummary, AttendanceRow, LeaveTypeBreakdown, RadarMetric};
use attendance_core::parsers::minutes_to_hours;

use crate::classifier::RowClassifier;

/// Weight of the attendance rate in the compliance blend.
const COMPLIANCE_ATTENDANCE_WEIGHT: f64 = 0.6;
/// Weight of the punctuality rate in the compliance blend.
const COMPLIANCE_PUNCTUALITY_WEIGHT: f64 = 0.4;
/// Attendance rates above this threshold display as a full radar axis.
const EFFECTIVENESS_SNAP_THRESHOLD: f64 = 95.0;

// ── AttendanceAggregator ──────────────────────────────────────────────────────

/// Stateless reducer from a row collection to an [`AnalyticsSummary`].
pub struct AttendanceAggregator;

impl AttendanceAggregator {
    /// Reduce `rows` into the analytics summary.
    ///
    /// Returns `None` for an empty collection — the defined "no data"
    /// sentinel, not an error. Callers must branch on it before reading
    /// summary fields.
    ///
    /// The pass is pure and idempotent: the same rows always produce the
    /// same summary.
    pub fn compute_summary(
        rows: &[AttendanceRow],
        classifier: &RowClassifier,
    ) -> Option<AnalyticsSummary> {
        if rows.is_empty() {
            return None;
        }

        // Distinct employees over the FULL collection, working day or not.
        let total_employees = rows
            .iter()
            .map(|r| r.employee_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        // The working-day universe: denominator for attendance, punctuality
        // and overtime-rate.
        let working: Vec<&AttendanceRow> = rows
            .iter()
            .filter(|r| classifier.is_working_day(r))
            .collect();
        let total_working_days = working.len();

        let attendance_count = working
            .iter()
            .filter(|r| classifier.validate_attendance(r).is_present)
            .count();

        let late_record_count = working.iter().filter(|r| classifier.is_late(r)).count();
        let total_late_minutes: u64 = working
            .iter()
            .map(|r| classifier.late_minutes(r) as u64)
            .sum();

        // Overtime scans ALL rows: overtime can occur on an excluded or
        // weekend day.
        let overtime_record_count = rows
            .iter()
            .filter(|r| classifier.is_overtime_record(r))
            .count();
        let total_overtime_minutes: u64 = rows
            .iter()
            .map(|r| classifier.overtime_minutes(r) as u64)
            .sum();

        let leave_type_breakdown = Self::leave_breakdown(rows);

        // Percentage KPIs. Late and punctuality rates are relative to those
        // who showed up, not to all working days.
        let attendance_rate = percent(attendance_count, total_working_days);
        let late_rate = percent(late_record_count, attendance_count);
        let overtime_rate = percent(overtime_record_count, total_working_days);
        let on_time_count = attendance_count.saturating_sub(late_record_count);
        let punctuality_rate = percent(on_time_count, attendance_count);

        // The blend is defined over the already-rounded rate strings.
        let compliance_score = format_fixed2(
            rate_value(&attendance_rate) * COMPLIANCE_ATTENDANCE_WEIGHT
                + rate_value(&punctuality_rate) * COMPLIANCE_PUNCTUALITY_WEIGHT,
        );

        let radar_metrics = Self::radar_metrics(
            &attendance_rate,
            &punctuality_rate,
            &compliance_score,
            &late_rate,
        );

        Some(AnalyticsSummary {
            total_employees,
            total_working_days,
            attendance_count,
            late_record_count,
            overtime_record_count,
            total_late_hours: minutes_to_hours(total_late_minutes),
            total_overtime_hours: minutes_to_hours(total_overtime_minutes),
            attendance_rate,
            punctuality_rate,
            late_rate,
            overtime_rate,
            compliance_score,
            leave_type_breakdown,
            radar_metrics,
        })
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Count each leave category across the full collection.
    ///
    /// A row counts at most once per category, but a tag containing
    /// synonyms of two categories counts under both — the keyword matching
    /// is deliberately loose.
    fn leave_breakdown(rows: &[AttendanceRow]) -> LeaveTypeBreakdown {
        let mut breakdown = LeaveTypeBreakdown::default();
        for row in rows {
            let tag = row.exception_tag.as_text_lossy().to_lowercase();
            if tag.is_empty() {
                continue;
            }
            for category in LeaveCategory::ALL {
                if !category.matches(&tag) {
                    continue;
                }
                match category {
                    LeaveCategory::Sick => breakdown.sick += 1,
                    LeaveCategory::Leave => breakdown.leave += 1,
                    LeaveCategory::BusinessTrip => breakdown.business_trip += 1,
                    LeaveCategory::Unpaid => breakdown.unpaid_leave += 1,
                    LeaveCategory::Wfh => breakdown.wfh += 1,
                }
            }
        }
        breakdown
    }

    /// The fixed five-axis radar sequence, in display order.
    ///
    /// Effectiveness is a display rule only: an attendance rate above 95
    /// snaps to a full axis without touching the underlying rate.
    fn radar_metrics(
        attendance_rate: &str,
        punctuality_rate: &str,
        compliance_score: &str,
        late_rate: &str,
    ) -> Vec<RadarMetric> {
        let attendance = rate_value(attendance_rate);
        let effectiveness = if attendance > EFFECTIVENESS_SNAP_THRESHOLD {
            100.0
        } else {
            attendance
        };
        vec![
            RadarMetric::new("Attendance", attendance),
            RadarMetric::new("Punctuality", rate_value(punctuality_rate)),
            RadarMetric::new("Compliance", rate_value(compliance_score)),
            RadarMetric::new("Time Discipline", 100.0 - rate_value(late_rate)),
            RadarMetric::new("Effectiveness", effectiveness),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::models::CellValue;

    fn classifier() -> RowClassifier {
        RowClassifier::default()
    }

    /// Weekday row (2026-01-01 is a Thursday) with an 08:00–17:00 schedule.
    fn scheduled_row(emp: &str) -> AttendanceRow {
        AttendanceRow {
            employee_id: emp.to_string(),
            date: CellValue::from("01/01/2026"),
            scheduled_in: CellValue::from("08:00"),
            scheduled_out: CellValue::from("17:00"),
            ..AttendanceRow::default()
        }
    }

    fn present_row(emp: &str) -> AttendanceRow {
        AttendanceRow {
            scanned_in: CellValue::from("07:55"),
            scanned_out: CellValue::from("17:05"),
            ..scheduled_row(emp)
        }
    }

    // ── Sentinel ──────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_rows_returns_sentinel() {
        assert!(AttendanceAggregator::compute_summary(&[], &classifier()).is_none());
    }

    // ── Counts and rates ──────────────────────────────────────────────────────

    #[test]
    fn test_single_late_present_row() {
        // Scheduled 08:00, scanned 09:30 on a weekday, no exception tag.
        let rows = vec![AttendanceRow {
            scanned_in: CellValue::from("09:30"),
            ..scheduled_row("001")
        }];
        let s = AttendanceAggregator::compute_summary(&rows, &classifier()).unwrap();

        assert_eq!(s.total_employees, 1);
        assert_eq!(s.total_working_days, 1);
        assert_eq!(s.attendance_count, 1);
        assert_eq!(s.late_record_count, 1);
        assert_eq!(s.attendance_rate, "100.00");
        assert_eq!(s.late_rate, "100.00");
        assert_eq!(s.punctuality_rate, "0.00");
        // 0.6 * 100 + 0.4 * 0.
        assert_eq!(s.compliance_score, "60.00");
        // 90 late minutes.
        assert_eq!(s.total_late_hours, "1.50");
    }

    #[test]
    fn test_sick_row_excluded_but_counted_in_breakdown() {
        let rows = vec![AttendanceRow {
            exception_tag: CellValue::from("sick"),
            ..scheduled_row("001")
        }];
        let s = AttendanceAggregator::compute_summary(&rows, &classifier()).unwrap();

        assert_eq!(s.total_working_days, 0);
        assert_eq!(s.attendance_count, 0);
        assert_eq!(s.leave_type_breakdown.sick, 1);
        assert_eq!(s.attendance_rate, "0.00");
        assert_eq!(s.total_employees, 1);
    }

    #[test]
    fn test_on_duty_row_present_not_late() {
        let rows = vec![AttendanceRow {
            exception_tag: CellValue::from("dinas"),
            ..scheduled_row("001")
        }];
        let s = AttendanceAggregator::compute_summary(&rows, &classifier()).unwrap();

        assert_eq!(s.total_working_days, 1);
        assert_eq!(s.attendance_count, 1);
        assert_eq!(s.late_record_count, 0);
        assert_eq!(s.leave_type_breakdown.business_trip, 1);
    }

    #[test]
    fn test_overtime_record_and_hours() {
        // Scan-out 45 minutes past schedule, no declared overtime.
        let rows = vec![AttendanceRow {
            scanned_in: CellValue::from("08:00"),
            scanned_out: CellValue::from("17:45"),
            ..scheduled_row("001")
        }];
        let s = AttendanceAggregator::compute_summary(&rows, &classifier()).unwrap();

        assert_eq!(s.overtime_record_count, 1);
        assert_eq!(s.total_overtime_hours, "0.75");
        assert_eq!(s.overtime_rate, "100.00");
    }

    #[test]
    fn test_late_rate_denominator_is_attendance_count() {
        // Three working rows: one late present, one on-time present, one
        // absent. Late rate is 1/2 (relative to those who showed up), not
        // 1/3 of all working days.
        let rows = vec![
            AttendanceRow {
                scanned_in: CellValue::from("09:30"),
                scanned_out: CellValue::from("17:00"),
                ..scheduled_row("001")
            },
            present_row("002"),
            scheduled_row("003"),
        ];
        let s = AttendanceAggregator::compute_summary(&rows, &classifier()).unwrap();

        assert_eq!(s.total_working_days, 3);
        assert_eq!(s.attendance_count, 2);
        assert_eq!(s.late_record_count, 1);
        assert_eq!(s.late_rate, "50.00");
        assert_eq!(s.punctuality_rate, "50.00");
        assert_eq!(s.attendance_rate, "66.67");
    }

    #[test]
    fn test_overtime_scans_all_rows_not_just_working_days() {
        // A weekend row with a large scan overrun: not a working day, but
        // its overtime still counts. The rate denominator stays the
        // working-day count.
        let weekend_overtime = AttendanceRow {
            weekend_flag: CellValue::from("true"),
            scanned_out: CellValue::from("18:00"),
            ..scheduled_row("001")
        };
        let rows = vec![weekend_overtime, present_row("002")];
        let s = AttendanceAggregator::compute_summary(&rows, &classifier()).unwrap();

        assert_eq!(s.total_working_days, 1);
        assert_eq!(s.overtime_record_count, 1);
        assert_eq!(s.overtime_rate, "100.00");
        // 60 weekend minutes + 5 sub-threshold minutes from the present row.
        assert_eq!(s.total_overtime_hours, "1.08");
    }

    #[test]
    fn test_zero_working_days_never_divides_by_zero() {
        // Every row weekend-flagged → totalWorkingDays == 0.
        let rows: Vec<AttendanceRow> = (0..3)
            .map(|i| AttendanceRow {
                weekend_flag: CellValue::from("true"),
                ..scheduled_row(&format!("{:03}", i))
            })
            .collect();
        let s = AttendanceAggregator::compute_summary(&rows, &classifier()).unwrap();

        assert_eq!(s.total_working_days, 0);
        assert_eq!(s.attendance_rate, "0.00");
        assert_eq!(s.overtime_rate, "0.00");
        assert_eq!(s.late_rate, "0.00");
        assert_eq!(s.punctuality_rate, "0.00");
        assert_eq!(s.compliance_score, "0.00");
    }

    #[test]
    fn test_distinct_employees_across_all_rows() {
        let rows = vec![
            present_row("001"),
            present_row("001"),
            AttendanceRow {
                exception_tag: CellValue::from("cuti"),
                ..scheduled_row("002")
            },
        ];
        let s = AttendanceAggregator::compute_summary(&rows, &classifier()).unwrap();
        // The excluded employee still counts toward the distinct total.
        assert_eq!(s.total_employees, 2);
        assert_eq!(s.total_working_days, 2);
    }

    // ── Leave breakdown ───────────────────────────────────────────────────────

    #[test]
    fn test_leave_breakdown_counts_once_per_category() {
        let rows = vec![
            AttendanceRow {
                // Matches both Sick synonyms: still one Sick count. Also
                // matches Leave via "leave".
                exception_tag: CellValue::from("sakit / sick leave"),
                ..scheduled_row("001")
            },
            AttendanceRow {
                exception_tag: CellValue::from("unpaid"),
                ..scheduled_row("002")
            },
            AttendanceRow {
                exception_tag: CellValue::from("wfh"),
                ..scheduled_row("003")
            },
        ];
        let s = AttendanceAggregator::compute_summary(&rows, &classifier()).unwrap();
        let b = &s.leave_type_breakdown;
        assert_eq!(b.sick, 1);
        assert_eq!(b.leave, 1);
        assert_eq!(b.unpaid_leave, 1);
        assert_eq!(b.wfh, 1);
        assert_eq!(b.business_trip, 0);
    }

    // ── Radar ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_radar_fixed_order_and_values() {
        let rows = vec![
            AttendanceRow {
                scanned_in: CellValue::from("09:30"),
                ..scheduled_row("001")
            },
            present_row("002"),
        ];
        let s = AttendanceAggregator::compute_summary(&rows, &classifier()).unwrap();

        let labels: Vec<&str> = s.radar_metrics.iter().map(|m| m.metric.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Attendance",
                "Punctuality",
                "Compliance",
                "Time Discipline",
                "Effectiveness"
            ]
        );
        assert_eq!(s.radar_metrics.len(), 5);
        // Time Discipline = 100 − lateRate (50.00 here).
        assert!((s.radar_metrics[3].value - 50.0).abs() < 1e-9);
        assert!(s.radar_metrics.iter().all(|m| m.full_mark == 100.0));
    }

    #[test]
    fn test_radar_effectiveness_snaps_above_95() {
        // 24 present of 25 working days → 96.00% attendance.
        let mut rows: Vec<AttendanceRow> = (0..24).map(|i| present_row(&format!("{i}"))).collect();
        rows.push(scheduled_row("absent"));
        let s = AttendanceAggregator::compute_summary(&rows, &classifier()).unwrap();

        assert_eq!(s.attendance_rate, "96.00");
        let effectiveness = &s.radar_metrics[4];
        assert_eq!(effectiveness.value, 100.0);
        // The underlying rate is untouched.
        assert!((s.radar_metrics[0].value - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_radar_effectiveness_not_snapped_at_95_or_below() {
        // 19 of 20 → exactly 95.00: no snap.
        let mut rows: Vec<AttendanceRow> = (0..19).map(|i| present_row(&format!("{i}"))).collect();
        rows.push(scheduled_row("absent"));
        let s = AttendanceAggregator::compute_summary(&rows, &classifier()).unwrap();

        assert_eq!(s.attendance_rate, "95.00");
        assert!((s.radar_metrics[4].value - 95.0).abs() < 1e-9);
    }

    // ── Idempotence ───────────────────────────────────────────────────────────

    #[test]
    fn test_compute_summary_is_idempotent() {
        let rows = vec![
            AttendanceRow {
                scanned_in: CellValue::from("09:30"),
                scanned_out: CellValue::from("17:45"),
                ..scheduled_row("001")
            },
            AttendanceRow {
                exception_tag: CellValue::from("sick"),
                ..scheduled_row("002")
            },
            present_row("003"),
        ];
        let c = classifier();
        let first = AttendanceAggregator::compute_summary(&rows, &c).unwrap();
        let second = AttendanceAggregator::compute_summary(&rows, &c).unwrap();
        assert_eq!(first, second);
    }
}
