//! CSV/JSON report tables
//!
//! Layout of a report directory:
//!
//! ```text
//! <dir>/
//!   timing.csv                 node,total_time,entered_matching_loop,matching_time,matching_queue_time,theory_time
//!   backtracking_nodes.csv     backtracking_node
//!   backtrack_distances.csv    distance,count          (most frequent first)
//!   high_time_distances.csv    node,distance,seconds
//!   general.json               RunSummary
//! ```
//!
//! Every file is opened, written and flushed inside a single call, so a file
//! handle never outlives the write that needed it.

use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use nodescope_common::{BACKTRACK_COLUMN, TIMING_COLUMNS};

use super::ReportSink;
use crate::domain::{DistanceBucket, ExportError, NodeDistance, NodeIndex, NodeRuntime};
use crate::run_data::RunReport;

pub const TIMING_TABLE: &str = "timing.csv";
pub const BACKTRACK_TABLE: &str = "backtracking_nodes.csv";
pub const HISTOGRAM_TABLE: &str = "backtrack_distances.csv";
pub const DISTANCES_TABLE: &str = "high_time_distances.csv";
pub const SUMMARY_FILE: &str = "general.json";

/// Write the per-node timing table, one row per record in node order.
///
/// # Errors
/// Propagates write errors from `out`.
pub fn write_timing_table<W: Write>(out: &mut W, nodes: &[NodeRuntime]) -> std::io::Result<()> {
    writeln!(out, "{}", TIMING_COLUMNS.join(","))?;
    for n in nodes {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            n.node,
            n.time,
            u8::from(n.entered_matching_loop),
            n.matching_time,
            n.matching_queue_time,
            n.theory_time
        )?;
    }
    Ok(())
}

/// Write the backtrack table in recording order.
///
/// # Errors
/// Propagates write errors from `out`.
pub fn write_backtracking_table<W: Write>(out: &mut W, nodes: &[NodeIndex]) -> std::io::Result<()> {
    writeln!(out, "{BACKTRACK_COLUMN}")?;
    for node in nodes {
        writeln!(out, "{node}")?;
    }
    Ok(())
}

/// Write the distance histogram in the order given.
///
/// # Errors
/// Propagates write errors from `out`.
pub fn write_distance_histogram<W: Write>(
    out: &mut W,
    histogram: &[DistanceBucket],
) -> std::io::Result<()> {
    writeln!(out, "distance,count")?;
    for bucket in histogram {
        writeln!(out, "{},{}", bucket.distance, bucket.count)?;
    }
    Ok(())
}

/// Write the per-node distance assignments.
///
/// # Errors
/// Propagates write errors from `out`.
pub fn write_high_time_distances<W: Write>(
    out: &mut W,
    distances: &[NodeDistance],
) -> std::io::Result<()> {
    writeln!(out, "node,distance,seconds")?;
    for d in distances {
        writeln!(out, "{},{},{}", d.node, d.distance, d.seconds)?;
    }
    Ok(())
}

/// Writes report tables into a directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// The directory is created on first emit if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn write_file<F>(&self, table: &'static str, write: F) -> Result<(), ExportError>
    where
        F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
    {
        let path = self.dir.join(table);
        let wrap = |source: std::io::Error| ExportError::WriteFailed { table, source };

        let mut out = BufWriter::new(File::create(&path).map_err(wrap)?);
        write(&mut out).map_err(wrap)?;
        out.flush().map_err(wrap)?;

        debug!("wrote {}", path.display());
        Ok(())
    }
}

impl ReportSink for ReportWriter {
    fn emit(&mut self, report: &RunReport) -> Result<(), ExportError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|source| ExportError::CreateDirFailed { path: self.dir.clone(), source })?;

        self.write_file(TIMING_TABLE, |out| write_timing_table(out, &report.nodes))?;
        self.write_file(BACKTRACK_TABLE, |out| {
            write_backtracking_table(out, &report.backtracking_nodes)
        })?;
        self.write_file(HISTOGRAM_TABLE, |out| {
            write_distance_histogram(out, &report.correlation.histogram)
        })?;
        self.write_file(DISTANCES_TABLE, |out| {
            write_high_time_distances(out, &report.correlation.distances)
        })?;
        self.write_file(SUMMARY_FILE, |out| {
            serde_json::to_writer_pretty(&mut *out, &report.summary)?;
            writeln!(out)
        })?;

        info!(
            "Report written to {} ({} nodes, {} backtracks, {} high-time nodes)",
            self.dir.display(),
            report.nodes.len(),
            report.backtracking_nodes.len(),
            report.high_time_nodes.len()
        );
        Ok(())
    }
}
