mod bootstrap;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use attendance_core::exceptions::ExceptionTaxonomy;
use attendance_core::models::AnalyticsSummary;
use attendance_data::analysis::analyze_file;
use attendance_data::reader::write_template_csv;
use attendance_data::snapshot::KpiSnapshot;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Aligned human-readable report.
    Text,
    /// Pretty-printed JSON summary.
    Json,
}

/// Attendance analytics for HRIS exports.
///
/// Reads attendance sheets (CSV or JSON), classifies each row against the
/// exception taxonomy, and reports the attendance / punctuality / overtime
/// KPIs with a five-axis radar summary.
#[derive(Debug, Parser)]
#[command(name = "hris-analytics", version, about)]
struct Cli {
    /// Attendance export file (.csv / .json) or a directory of exports.
    #[arg(required_unless_present = "write_template")]
    input: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Exception taxonomy file (JSON); the built-in keyword lists are used
    /// when absent.
    #[arg(long)]
    taxonomy: Option<PathBuf>,

    /// Append a KPI snapshot of this run to the given JSONL log.
    #[arg(long)]
    save_kpi: Option<PathBuf>,

    /// Metric label recorded with the KPI snapshot.
    #[arg(long, default_value = "productivity")]
    metric_label: String,

    /// Reporting period for the KPI snapshot (YYYY-MM-DD); defaults to
    /// today.
    #[arg(long)]
    period_date: Option<NaiveDate>,

    /// Write an empty import template (headers only) to the given path and
    /// exit.
    #[arg(long)]
    write_template: Option<PathBuf>,

    /// Log level (DEBUG, INFO, WARNING, ERROR).
    #[arg(long, env = "HRIS_ANALYTICS_LOG", default_value = "WARNING")]
    log_level: String,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&cli.log_level)?;

    tracing::info!("hris-analytics v{} starting", env!("CARGO_PKG_VERSION"));

    if let Some(template_path) = &cli.write_template {
        write_template_csv(template_path)
            .with_context(|| format!("writing template to {}", template_path.display()))?;
        println!("Template written to {}", template_path.display());
        return Ok(());
    }

    // clap enforces presence when --write-template is absent.
    let input = cli.input.as_ref().context("input path is required")?;

    let taxonomy = match &cli.taxonomy {
        Some(path) => ExceptionTaxonomy::from_file(path)
            .with_context(|| format!("loading taxonomy from {}", path.display()))?,
        None => ExceptionTaxonomy::default(),
    };

    let result = analyze_file(input, taxonomy)
        .with_context(|| format!("analyzing {}", input.display()))?;

    tracing::info!(
        "Processed {} rows ({} working days) in {:.3}s load + {:.3}s compute",
        result.metadata.rows_processed,
        result.metadata.working_days,
        result.metadata.load_time_seconds,
        result.metadata.compute_time_seconds,
    );

    let Some(summary) = result.summary else {
        // No rows at all: a defined state, not an error.
        match cli.output {
            OutputFormat::Json => println!("null"),
            OutputFormat::Text => println!("No attendance data to analyze."),
        }
        return Ok(());
    };

    match cli.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print!("{}", render_text(&summary)),
    }

    if let Some(kpi_path) = &cli.save_kpi {
        let period = cli
            .period_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let snapshot = KpiSnapshot::from_summary(&summary, cli.metric_label.clone(), period)?;
        snapshot
            .append_jsonl(kpi_path)
            .with_context(|| format!("appending KPI snapshot to {}", kpi_path.display()))?;
        println!(
            "KPI snapshot ({}, {}) appended to {}",
            snapshot.metric_type,
            period,
            kpi_path.display()
        );
    }

    Ok(())
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render the summary as an aligned plain-text report.
fn render_text(summary: &AnalyticsSummary) -> String {
    let mut out = String::new();
    let b = &summary.leave_type_breakdown;

    out.push_str("Attendance Analytics\n");
    out.push_str("====================\n");
    out.push_str(&format!("Employees            {}\n", summary.total_employees));
    out.push_str(&format!("Working days         {}\n", summary.total_working_days));
    out.push_str(&format!("Attendance           {}\n", summary.attendance_count));
    out.push_str(&format!("Late records         {}\n", summary.late_record_count));
    out.push_str(&format!("Overtime records     {}\n", summary.overtime_record_count));
    out.push_str(&format!("Late hours           {}\n", summary.total_late_hours));
    out.push_str(&format!("Overtime hours       {}\n", summary.total_overtime_hours));
    out.push('\n');
    out.push_str(&format!("Attendance rate      {}%\n", summary.attendance_rate));
    out.push_str(&format!("Punctuality rate     {}%\n", summary.punctuality_rate));
    out.push_str(&format!("Late rate            {}%\n", summary.late_rate));
    out.push_str(&format!("Overtime rate        {}%\n", summary.overtime_rate));
    out.push_str(&format!("Compliance score     {}\n", summary.compliance_score));
    out.push('\n');
    out.push_str("Leave breakdown\n");
    out.push_str(&format!("  Sick               {}\n", b.sick));
    out.push_str(&format!("  Leave              {}\n", b.leave));
    out.push_str(&format!("  Business trip      {}\n", b.business_trip));
    out.push_str(&format!("  Unpaid leave       {}\n", b.unpaid_leave));
    out.push_str(&format!("  WFH                {}\n", b.wfh));
    out.push('\n');
    out.push_str("Radar\n");
    for metric in &summary.radar_metrics {
        out.push_str(&format!("  {:<19}{:.2}\n", metric.metric, metric.value));
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::models::{LeaveTypeBreakdown, RadarMetric};

    fn sample_summary() -> AnalyticsSummary {
        AnalyticsSummary {
            total_employees: 2,
            total_working_days: 10,
            attendance_count: 9,
            late_record_count: 1,
            overtime_record_count: 0,
            total_late_hours: "1.50".to_string(),
            total_overtime_hours: "0.00".to_string(),
            attendance_rate: "90.00".to_string(),
            punctuality_rate: "88.89".to_string(),
            late_rate: "11.11".to_string(),
            overtime_rate: "0.00".to_string(),
            compliance_score: "89.56".to_string(),
            leave_type_breakdown: LeaveTypeBreakdown {
                sick: 1,
                ..LeaveTypeBreakdown::default()
            },
            radar_metrics: vec![
                RadarMetric::new("Attendance", 90.0),
                RadarMetric::new("Time Discipline", 88.89),
            ],
        }
    }

    // ── CLI parsing ───────────────────────────────────────────────────────────

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["hris-analytics", "january.csv"]).unwrap();
        assert_eq!(cli.input.unwrap(), PathBuf::from("january.csv"));
        assert_eq!(cli.output, OutputFormat::Text);
        assert_eq!(cli.metric_label, "productivity");
        assert!(cli.taxonomy.is_none());
        assert!(cli.save_kpi.is_none());
    }

    #[test]
    fn test_cli_requires_input_without_template() {
        assert!(Cli::try_parse_from(["hris-analytics"]).is_err());
        let cli =
            Cli::try_parse_from(["hris-analytics", "--write-template", "t.csv"]).unwrap();
        assert!(cli.input.is_none());
        assert_eq!(cli.write_template.unwrap(), PathBuf::from("t.csv"));
    }

    #[test]
    fn test_cli_parses_period_date() {
        let cli = Cli::try_parse_from([
            "hris-analytics",
            "data.csv",
            "--output",
            "json",
            "--save-kpi",
            "kpi.jsonl",
            "--period-date",
            "2026-01-31",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(
            cli.period_date.unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
        );
    }

    #[test]
    fn test_cli_rejects_bad_period_date() {
        assert!(Cli::try_parse_from([
            "hris-analytics",
            "data.csv",
            "--period-date",
            "31/01/2026",
        ])
        .is_err());
    }

    // ── render_text ───────────────────────────────────────────────────────────

    #[test]
    fn test_render_text_contains_all_kpis() {
        let text = render_text(&sample_summary());
        assert!(text.contains("Attendance rate      90.00%"));
        assert!(text.contains("Punctuality rate     88.89%"));
        assert!(text.contains("Compliance score     89.56"));
        assert!(text.contains("  Sick               1"));
        assert!(text.contains("Time Discipline    88.89"));
    }
}
