//! Report export functionality
//!
//! This module renders a finished [`RunReport`](crate::run_data::RunReport)
//! to a sink. [`ReportWriter`] writes the CSV tables and JSON summary into a
//! directory that [`RunData::load`](crate::run_data::RunData::load) can read
//! back.

pub mod tables;

pub use tables::{
    write_backtracking_table, write_distance_histogram, write_high_time_distances,
    write_timing_table, ReportWriter, BACKTRACK_TABLE, DISTANCES_TABLE, HISTOGRAM_TABLE,
    SUMMARY_FILE, TIMING_TABLE,
};

use crate::domain::ExportError;
use crate::run_data::RunReport;

/// Destination for a finished run
///
/// Called exactly once per run, when the profiler finishes.
pub trait ReportSink {
    /// Render `report`.
    ///
    /// # Errors
    /// Returns an error when the report could not be written in full.
    fn emit(&mut self, report: &RunReport) -> Result<(), ExportError>;
}
