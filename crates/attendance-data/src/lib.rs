//! Ingestion and pipeline layer for the attendance analytics engine.
//!
//! Responsible for discovering and loading attendance files (CSV and JSON),
//! classifying each row against the exception taxonomy, reducing the row
//! collection into the KPI summary, and running the top-level analysis
//! pipeline.

pub mod aggregator;
pub mod analysis;
pub mod classifier;
pub mod reader;
pub mod snapshot;

pub use attendance_core as core;
