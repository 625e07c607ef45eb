use serde::{Deserialize, Serialize};

/// A raw spreadsheet cell as it arrives from the ingestion layer.
///
/// Attendance exports are human-edited: the same column can hold a number in
/// one row and free text in the next. Instead of coercing implicitly, every
/// cell is carried as an explicit encoding and each parser dispatches on the
/// shape exactly once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing cell, empty string after trimming, or JSON `null`.
    #[default]
    Empty,
    /// JSON boolean (explicit weekend/holiday flags).
    Bool(bool),
    /// Spreadsheet-native numeric value (time fraction-of-day, date serial).
    Number(f64),
    /// Anything textual: `"HH:MM"`, `"01/01/2026"`, exception tags, flags.
    Text(String),
}

impl CellValue {
    /// Whether the cell carries no value at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Lossy textual rendering, used for free-text fields such as the
    /// exception tag. `Empty` renders as the empty string.
    pub fn as_text_lossy(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

// ── AttendanceRow ─────────────────────────────────────────────────────────────

/// One attendance record: one employee on one calendar date.
///
/// Field names bind to the column headers of the original deployment's
/// export template (with English aliases), so existing templates load
/// unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceRow {
    /// Opaque employee identifier; used only for the distinct-employee count.
    #[serde(rename = "Emp No.", alias = "Employee ID", default)]
    pub employee_id: String,
    /// Calendar date in any of the admissible encodings.
    #[serde(rename = "Tanggal", alias = "Date", default)]
    pub date: CellValue,
    /// Nominal shift start, time-of-day encoding.
    #[serde(rename = "Jam Masuk", alias = "Scheduled In", default)]
    pub scheduled_in: CellValue,
    /// Nominal shift end, time-of-day encoding.
    #[serde(rename = "Jam Pulang", alias = "Scheduled Out", default)]
    pub scheduled_out: CellValue,
    /// Observed clock-in. Missing/zero means "no scan recorded", not midnight.
    #[serde(rename = "Scan Masuk", alias = "Scan In", default)]
    pub scanned_in: CellValue,
    /// Observed clock-out. Missing/zero means "no scan recorded".
    #[serde(rename = "Scan Pulang", alias = "Scan Out", default)]
    pub scanned_out: CellValue,
    /// Explicitly declared overtime duration, time encoding.
    #[serde(rename = "Lembur", alias = "Overtime", default)]
    pub overtime_declared: CellValue,
    /// Free-text exception label, classified by keyword containment.
    #[serde(rename = "Pengecualian", alias = "Exception", default)]
    pub exception_tag: CellValue,
    /// Explicit weekend flag; accepts textual "true"/"1".
    #[serde(rename = "Akhir Pekan", alias = "Weekend", default)]
    pub weekend_flag: CellValue,
    /// Explicit holiday flag; accepts textual "true"/"1".
    #[serde(rename = "Hari Libur", alias = "Holiday", default)]
    pub holiday_flag: CellValue,
}

// ── Classification output ─────────────────────────────────────────────────────

/// Presence verdict for a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceVerdict {
    /// Counts as attendance (scan recorded or on-duty-elsewhere tag).
    pub is_present: bool,
    /// Exactly one of the two clock events recorded.
    pub is_partial: bool,
    /// On duty elsewhere (business trip / remote / meeting tag).
    pub is_on_duty: bool,
}

/// Per-row classification, derived during the reduction pass and never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedRow {
    /// Whether this row counts in the analytic denominators.
    pub is_working_day: bool,
    pub is_present: bool,
    pub is_partial: bool,
    /// Minutes past the scheduled clock-in, when the lateness test fires.
    pub late_minutes: u32,
    /// Declared overtime if nonzero, else minutes past the scheduled
    /// clock-out (floored at 0). Accumulated over ALL rows, whether or not
    /// the row qualifies as an overtime record.
    pub overtime_minutes: u32,
}

// ── AnalyticsSummary ──────────────────────────────────────────────────────────

/// Row counts per leave category, scanned across the full row collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveTypeBreakdown {
    pub sick: usize,
    pub leave: usize,
    pub business_trip: usize,
    pub unpaid_leave: usize,
    pub wfh: usize,
}

/// One axis of the fixed five-axis radar-chart summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarMetric {
    /// Axis label, e.g. `"Attendance"`.
    pub metric: String,
    /// Value in the 0–100 range.
    pub value: f64,
    /// Chart ceiling; always 100.
    pub full_mark: f64,
}

impl RadarMetric {
    /// Build an axis with the standard 100-point ceiling.
    pub fn new(metric: impl Into<String>, value: f64) -> Self {
        Self {
            metric: metric.into(),
            value,
            full_mark: 100.0,
        }
    }
}

/// The sole artifact of an analytics run.
///
/// Percentage KPIs are carried as already-rounded two-decimal strings
/// (`"0.00"`–`"100.00"`); downstream consumers that need the numeric value
/// parse it back, which is also how the compliance blend is defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    /// Distinct employee ids across ALL rows, not just working days.
    pub total_employees: usize,
    /// Number of mandatory-attendance rows; the main KPI denominator.
    pub total_working_days: usize,
    /// Working rows with a presence verdict.
    pub attendance_count: usize,
    /// Working rows that passed the lateness test.
    pub late_record_count: usize,
    /// Rows (ALL rows) that passed the overtime test.
    pub overtime_record_count: usize,
    /// Total lateness in decimal hours, two-decimal string.
    pub total_late_hours: String,
    /// Total overtime in decimal hours, two-decimal string.
    pub total_overtime_hours: String,
    pub attendance_rate: String,
    pub punctuality_rate: String,
    pub late_rate: String,
    pub overtime_rate: String,
    /// Weighted blend: 60% attendance rate + 40% punctuality rate.
    pub compliance_score: String,
    pub leave_type_breakdown: LeaveTypeBreakdown,
    /// Fixed five-entry sequence for the radar chart, in display order.
    pub radar_metrics: Vec<RadarMetric>,
}

impl AnalyticsSummary {
    /// Numeric value of the attendance rate string (0.0 on parse failure).
    pub fn attendance_rate_value(&self) -> f64 {
        self.attendance_rate.parse().unwrap_or(0.0)
    }
}
