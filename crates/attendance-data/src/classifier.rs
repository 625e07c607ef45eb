//! Row classifier for attendance records.
//!
//! Given one [`AttendanceRow`] and the parsed fields, decides whether the
//! row is a mandatory working day, whether the employee counts as present or
//! partially present, and how many late / overtime minutes it contributes.

use chrono::{Datelike, Weekday};
use tracing::debug;

use attendance_core::exceptions::{ExceptionBucket, ExceptionTaxonomy};
use attendance_core::models::{AttendanceRow, AttendanceVerdict, ClassifiedRow};
use attendance_core::parsers::{is_flag_set, parse_calendar_date, parse_time_of_day};

/// Minutes past the scheduled clock-in before a scan counts as late.
pub const LATE_GRACE_MINUTES: u32 = 1;

/// Minutes past the scheduled clock-out before an unscheduled late departure
/// counts as an overtime record.
pub const OVERTIME_GRACE_MINUTES: u32 = 30;

// ── RowClassifier ─────────────────────────────────────────────────────────────

/// Stateless per-row classification over a fixed exception taxonomy.
pub struct RowClassifier {
    taxonomy: ExceptionTaxonomy,
}

impl RowClassifier {
    pub fn new(taxonomy: ExceptionTaxonomy) -> Self {
        let overlaps = taxonomy.overlaps();
        if !overlaps.is_empty() {
            debug!(
                "RowClassifier built over a taxonomy with {} overlap(s)",
                overlaps.len()
            );
        }
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &ExceptionTaxonomy {
        &self.taxonomy
    }

    /// The row's exception tag as text (empty when no tag is set).
    fn tag(row: &AttendanceRow) -> String {
        row.exception_tag.as_text_lossy()
    }

    /// Bucket membership probe for this row's tag.
    fn in_bucket(&self, row: &AttendanceRow, bucket: ExceptionBucket) -> bool {
        self.taxonomy.matches(&Self::tag(row), bucket)
    }

    /// Resolve the row's exception bucket.
    pub fn bucket(&self, row: &AttendanceRow) -> ExceptionBucket {
        self.taxonomy.bucket_of(&Self::tag(row))
    }

    // ── Working day ───────────────────────────────────────────────────────────

    /// Whether this row counts in the mandatory-attendance denominators.
    ///
    /// A working day requires ALL of:
    /// 1. not weekend-flagged, and not a Saturday/Sunday when the date
    ///    parses (an unparseable date carries no weekend information);
    /// 2. not holiday-flagged;
    /// 3. not an excluded exception — sick/leave days leave the measurement
    ///    universe entirely rather than counting as absence;
    /// 4. evidence of an expected workday: a nonzero scheduled-in, a nonzero
    ///    scanned-in, or a present-exception tag. An entirely blank row is
    ///    ambiguous and resolves to "not a working day", not "absent".
    pub fn is_working_day(&self, row: &AttendanceRow) -> bool {
        if is_flag_set(&row.weekend_flag) || is_flag_set(&row.holiday_flag) {
            return false;
        }
        if let Some(date) = parse_calendar_date(&row.date) {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                return false;
            }
        }
        if self.in_bucket(row, ExceptionBucket::Excluded) {
            return false;
        }

        let has_schedule = parse_time_of_day(&row.scheduled_in) > 0;
        let has_activity = parse_time_of_day(&row.scanned_in) > 0
            || self.in_bucket(row, ExceptionBucket::Present);
        has_schedule || has_activity
    }

    // ── Presence ──────────────────────────────────────────────────────────────

    /// Presence verdict for the row.
    ///
    /// * `is_on_duty` — present-exception tag (business trip, remote, …).
    /// * `is_present` — not penalized, and either a scan event exists or the
    ///   row is on duty elsewhere.
    /// * `is_partial` — exactly one of the two scan events recorded, for
    ///   rows that are neither on duty nor penalized: a missed clock-in or
    ///   clock-out.
    pub fn validate_attendance(&self, row: &AttendanceRow) -> AttendanceVerdict {
        let t_in = parse_time_of_day(&row.scanned_in);
        let t_out = parse_time_of_day(&row.scanned_out);
        let is_on_duty = self.in_bucket(row, ExceptionBucket::Present);
        let is_penalized = self.in_bucket(row, ExceptionBucket::Penalized);

        let is_present = !is_penalized && (t_in > 0 || t_out > 0 || is_on_duty);
        let is_partial = !is_on_duty && !is_penalized && ((t_in > 0) != (t_out > 0));

        AttendanceVerdict {
            is_present,
            is_partial,
            is_on_duty,
        }
    }

    // ── Lateness ──────────────────────────────────────────────────────────────

    /// Lateness test: scan-in beyond the scheduled-in plus one minute of
    /// grace. A row with no defined schedule cannot be late, and a
    /// present-exception row is never late (there is nothing to scan).
    pub fn is_late(&self, row: &AttendanceRow) -> bool {
        if self.in_bucket(row, ExceptionBucket::Present) {
            return false;
        }
        let scan = parse_time_of_day(&row.scanned_in);
        let sched = parse_time_of_day(&row.scheduled_in);
        scan > sched + LATE_GRACE_MINUTES && sched > 0
    }

    /// Minutes past the scheduled clock-in, zero when the lateness test
    /// does not fire.
    pub fn late_minutes(&self, row: &AttendanceRow) -> u32 {
        if !self.is_late(row) {
            return 0;
        }
        let scan = parse_time_of_day(&row.scanned_in);
        let sched = parse_time_of_day(&row.scheduled_in);
        scan - sched
    }

    // ── Overtime ──────────────────────────────────────────────────────────────

    /// Overtime-record test, applied to ALL rows (overtime can occur on a
    /// nominally non-working day): explicit declared overtime, or a scan-out
    /// more than 30 minutes past a nonzero scheduled-out.
    pub fn is_overtime_record(&self, row: &AttendanceRow) -> bool {
        if parse_time_of_day(&row.overtime_declared) > 0 {
            return true;
        }
        let scan = parse_time_of_day(&row.scanned_out);
        let sched = parse_time_of_day(&row.scheduled_out);
        scan > sched + OVERTIME_GRACE_MINUTES && sched > 0
    }

    /// Overtime minutes contributed by this row: the declared value when
    /// nonzero, otherwise the scan-out overrun floored at zero.
    ///
    /// The minute total deliberately accumulates overruns shorter than the
    /// 30-minute record threshold, matching the deployed behaviour.
    pub fn overtime_minutes(&self, row: &AttendanceRow) -> u32 {
        let declared = parse_time_of_day(&row.overtime_declared);
        if declared > 0 {
            return declared;
        }
        let scan = parse_time_of_day(&row.scanned_out);
        let sched = parse_time_of_day(&row.scheduled_out);
        scan.saturating_sub(sched)
    }

    // ── Full classification ───────────────────────────────────────────────────

    /// Classify one row. The result is ephemeral — it exists only for the
    /// duration of the reduction pass.
    pub fn classify(&self, row: &AttendanceRow) -> ClassifiedRow {
        let verdict = self.validate_attendance(row);
        ClassifiedRow {
            is_working_day: self.is_working_day(row),
            is_present: verdict.is_present,
            is_partial: verdict.is_partial,
            late_minutes: self.late_minutes(row),
            overtime_minutes: self.overtime_minutes(row),
        }
    }
}

impl Default for RowClassifier {
    fn default() -> Self {
        Self::new(ExceptionTaxonomy::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
