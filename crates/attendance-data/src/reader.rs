//! Attendance file discovery and loading.
//!
//! Reads exported attendance sheets (CSV or JSON) from a file or a
//! directory tree and converts them into [`AttendanceRow`] structs for the
//! classification pass. CSV cells are sniffed into [`CellValue`] shapes so
//! that a numeric spreadsheet export and a hand-typed text export load into
//! the same row type.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use attendance_core::error::{AnalyticsError, Result};
use attendance_core::models::{AttendanceRow, CellValue};

/// Column headers of the export template, in template order. The first
/// entry of each pair is the canonical header, the second the accepted
/// English alias.
pub const TEMPLATE_HEADERS: [(&str, &str); 10] = [
    ("Emp No.", "Employee ID"),
    ("Tanggal", "Date"),
    ("Jam Masuk", "Scheduled In"),
    ("Jam Pulang", "Scheduled Out"),
    ("Scan Masuk", "Scan In"),
    ("Scan Pulang", "Scan Out"),
    ("Lembur", "Overtime"),
    ("Pengecualian", "Exception"),
    ("Akhir Pekan", "Weekend"),
    ("Hari Libur", "Holiday"),
];

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` and `.json` files recursively under `dir`, sorted by path.
pub fn find_attendance_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Input path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load attendance rows from `path`.
///
/// * a `.csv` or `.json` file loads directly;
/// * a directory is scanned recursively and every attendance file found is
///   loaded, in path order;
/// * anything else is an error.
///
/// Row order within a file is preserved — the analytics are order-invariant,
/// but error messages reference positions.
pub fn load_rows(path: &Path) -> Result<Vec<AttendanceRow>> {
    if !path.exists() {
        return Err(AnalyticsError::InputPathNotFound(path.to_path_buf()));
    }

    if path.is_dir() {
        let files = find_attendance_files(path);
        if files.is_empty() {
            return Err(AnalyticsError::NoDataFiles(path.to_path_buf()));
        }
        let mut all_rows = Vec::new();
        for file in &files {
            all_rows.extend(load_rows(file)?);
        }
        debug!(
            "Loaded {} rows from {} files under {}",
            all_rows.len(),
            files.len(),
            path.display()
        );
        return Ok(all_rows);
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => load_rows_from_csv(path),
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_rows_from_json(path),
        _ => Err(AnalyticsError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Load rows from a CSV export.
///
/// Headers are matched case-insensitively against the template headers and
/// their English aliases; unrecognised columns are ignored. Records that
/// fail to parse are skipped with a warning rather than aborting the load —
/// a single mangled row must not take down a month of data.
pub fn load_rows_from_csv(path: &Path) -> Result<Vec<AttendanceRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| AnalyticsError::CsvParse {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let headers = reader
        .headers()
        .map_err(|e| AnalyticsError::CsvParse {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?
        .clone();

    // Column index → canonical header name.
    let columns: HashMap<usize, &'static str> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, header)| resolve_header(header).map(|canonical| (idx, canonical)))
        .collect();
    if columns.is_empty() {
        warn!(
            "No recognised attendance columns in {} (headers: {:?})",
            path.display(),
            headers
        );
    }

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    "Skipping unreadable record {} in {}: {}",
                    line + 1,
                    path.display(),
                    e
                );
                continue;
            }
        };

        let mut object = serde_json::Map::new();
        for (idx, canonical) in &columns {
            let Some(cell) = record.get(*idx) else {
                continue;
            };
            // The employee id is opaque text even when it looks numeric.
            let value = if *canonical == "Emp No." {
                serde_json::Value::String(cell.trim().to_string())
            } else {
                sniff_cell(cell)
            };
            object.insert((*canonical).to_string(), value);
        }

        match serde_json::from_value(serde_json::Value::Object(object)) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!(
                    "Skipping unmappable record {} in {}: {}",
                    line + 1,
                    path.display(),
                    e
                );
            }
        }
    }

    debug!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load rows from a JSON export: an array of row objects keyed by template
/// headers (or their aliases).
pub fn load_rows_from_json(path: &Path) -> Result<Vec<AttendanceRow>> {
    let contents = std::fs::read_to_string(path).map_err(|e| AnalyticsError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rows: Vec<AttendanceRow> = serde_json::from_str(&contents)?;
    debug!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Write an empty import template (canonical headers, no data rows) to
/// `path`.
pub fn write_template_csv(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| AnalyticsError::CsvParse {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    writer
        .write_record(TEMPLATE_HEADERS.iter().map(|(canonical, _)| *canonical))
        .and_then(|_| writer.flush().map_err(csv::Error::from))
        .map_err(|e| AnalyticsError::CsvParse {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Resolve a file header to its canonical template header, matching the
/// canonical name or the English alias case-insensitively.
fn resolve_header(header: &str) -> Option<&'static str> {
    let header = header.trim();
    TEMPLATE_HEADERS
        .iter()
        .find(|(canonical, alias)| {
            header.eq_ignore_ascii_case(canonical) || header.eq_ignore_ascii_case(alias)
        })
        .map(|(canonical, _)| *canonical)
}

/// Sniff a CSV cell into the JSON shape matching its [`CellValue`] encoding:
/// empty → null, `true`/`false` → boolean, numeric → number, anything else →
/// string.
fn sniff_cell(cell: &str) -> serde_json::Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return serde_json::Value::Null;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return serde_json::Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return serde_json::Value::Bool(false);
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        if n.is_finite() {
            if let Some(number) = serde_json::Number::from_f64(n) {
                return serde_json::Value::Number(number);
            }
        }
    }
    serde_json::Value::String(trimmed.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
