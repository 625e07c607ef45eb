//! Core domain layer for the attendance analytics engine.
//!
//! Holds the input/output models, the lenient field parsers for
//! spreadsheet-originated cell values, the exception taxonomy, and the
//! numeric formatting helpers shared by the pipeline crates.

pub mod error;
pub mod exceptions;
pub mod formatting;
pub mod models;
pub mod parsers;

pub use error::{AnalyticsError, Result};
