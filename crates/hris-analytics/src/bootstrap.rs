use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.hris-analytics/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.hris-analytics/`
/// - `~/.hris-analytics/logs/`
pub fn ensure_directories() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let app_dir = home.join(".hris-analytics");
    std::fs::create_dir_all(&app_dir)?;
    std::fs::create_dir_all(app_dir.join("logs"))?;
    Ok(app_dir)
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised. All output
/// goes to stderr so that stdout stays clean for the rendered summary.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
