//! KPI snapshot persistence.
//!
//! An analytics run can be pinned to a reporting period as a KPI log entry:
//! the attendance rate becomes the tracked value and the full summary rides
//! along as JSON notes, so the period's detail can be reconstructed later
//! without the source files. Snapshots append to a JSONL log, one record
//! per line.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use attendance_core::error::Result;
use attendance_core::models::AnalyticsSummary;

// ── KpiSnapshot ───────────────────────────────────────────────────────────────

/// One persisted KPI log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    /// Which KPI this record tracks, e.g. `"productivity"`.
    pub metric_type: String,
    /// The numeric KPI value: the attendance rate parsed back to a number.
    pub value: f64,
    /// Reporting period this snapshot belongs to.
    pub period_date: NaiveDate,
    /// The full [`AnalyticsSummary`] serialized as JSON text.
    pub notes: String,
}

impl KpiSnapshot {
    /// Build a snapshot from a computed summary.
    pub fn from_summary(
        summary: &AnalyticsSummary,
        metric_type: impl Into<String>,
        period_date: NaiveDate,
    ) -> Result<Self> {
        Ok(Self {
            metric_type: metric_type.into(),
            value: summary.attendance_rate_value(),
            period_date,
            notes: serde_json::to_string(summary)?,
        })
    }

    /// Append this snapshot to the JSONL log at `path`, creating the file
    /// when absent.
    pub fn append_jsonl(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let line = serde_json::to_string(self)?;
        writeln!(file, "{}", line)?;
        debug!(
            "Appended {} snapshot for {} to {}",
            self.metric_type,
            self.period_date,
            path.display()
        );
        Ok(())
    }

    /// Parse the notes back into the summary they were built from.
    pub fn summary(&self) -> Result<AnalyticsSummary> {
        Ok(serde_json::from_str(&self.notes)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
