use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the attendance analytics crates.
///
/// Malformed individual *cell values* are not errors — they degrade to
/// zero/`None` inside the parsers. Only file-level and configuration
/// problems surface here.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV document could not be parsed at the file level.
    ///
    /// The source is boxed so this crate does not depend on the `csv` crate
    /// used by the ingestion layer.
    #[error("Failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The input file has an extension the reader does not understand.
    #[error("Unsupported attendance file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// The expected input path does not exist.
    #[error("Input path not found: {0}")]
    InputPathNotFound(PathBuf),

    /// No attendance files were found under the given directory.
    #[error("No attendance files found in {0}")]
    NoDataFiles(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the attendance crates.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
