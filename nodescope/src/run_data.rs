//! Run data models
//!
//! [`RunReport`] is what a finished profiler hands to its report sink.
//! [`RunData`] is the same information read back from a report directory,
//! used by replay mode to re-run the analysis offline.

// Counts are reported as f64 statistics
#![allow(clippy::cast_precision_loss)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use nodescope_common::{BACKTRACK_COLUMN, SCHEMA_VERSION, TIMING_COLUMNS};

use crate::analysis::{correlate_backtrack_distances, Correlation, HighTimeFilter, HighTimeMetric};
use crate::domain::{HighTimeNode, NodeIndex, NodeRuntime, Phase, ReplayError};
use crate::export::{BACKTRACK_TABLE, SUMMARY_FILE, TIMING_TABLE};
use crate::stats::StatisticsSink;

/// Run-wide totals and counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub schema_version: u32,
    /// Number of node records
    pub node_count: usize,
    /// Node index reached when the run ended
    pub max_node: u32,
    /// Wall time of all nodes, in seconds
    pub total_time: f64,
    /// Cumulative seconds per phase, keyed by [`Phase::name`]
    pub phase_times: BTreeMap<String, f64>,
    pub backtrack_count: usize,
    pub scopes_popped: u64,
    pub high_time_count: usize,
    pub high_time_threshold: f64,
    pub high_time_metric: HighTimeMetric,
    pub mam_loop_iterations: u64,
    /// Executed matching-machine instructions by opcode name; zero counts omitted
    pub opcode_counts: BTreeMap<String, u64>,
}

/// Everything recorded for one search run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub nodes: Vec<NodeRuntime>,
    pub backtracking_nodes: Vec<NodeIndex>,
    pub high_time_nodes: Vec<HighTimeNode>,
    pub correlation: Correlation,
}

/// Report tables loaded back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct RunData {
    pub nodes: Vec<NodeRuntime>,
    pub backtracking_nodes: Vec<NodeIndex>,
    /// Present when the directory holds a summary file
    pub summary: Option<RunSummary>,
}

impl RunData {
    /// Load the tables written by [`ReportWriter`](crate::export::ReportWriter).
    ///
    /// The timing and backtrack tables are required; the summary is optional.
    ///
    /// # Errors
    /// Fails when a required table is missing or malformed, or when the summary
    /// was written with a different schema version.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let dir = dir.as_ref();

        let timing = read_table(&dir.join(TIMING_TABLE))?;
        let nodes = parse_timing_table(&timing, TIMING_TABLE)?;

        let backtracking = read_table(&dir.join(BACKTRACK_TABLE))?;
        let backtracking_nodes = parse_backtracking_table(&backtracking, BACKTRACK_TABLE)?;

        let summary_path = dir.join(SUMMARY_FILE);
        let summary = if summary_path.exists() {
            let summary: RunSummary =
                serde_json::from_str(&std::fs::read_to_string(&summary_path)?)?;
            if summary.schema_version != SCHEMA_VERSION {
                return Err(ReplayError::SchemaMismatch {
                    found: summary.schema_version,
                    expected: SCHEMA_VERSION,
                });
            }
            Some(summary)
        } else {
            None
        };

        Ok(Self { nodes, backtracking_nodes, summary })
    }

    /// Flag nodes with `filter` and correlate them with the backtrack log.
    #[must_use]
    pub fn analyze(&self, filter: &HighTimeFilter) -> (Vec<HighTimeNode>, Correlation) {
        let high_time = filter.select(&self.nodes);
        let correlation = correlate_backtrack_distances(&self.backtracking_nodes, &high_time);
        (high_time, correlation)
    }

    /// Push totals derivable from the tables into `sink`.
    pub fn collect_statistics<S: StatisticsSink + ?Sized>(
        &self,
        filter: &HighTimeFilter,
        sink: &mut S,
    ) {
        let high_time_count = self.nodes.iter().filter(|n| filter.check(n).is_some()).count();
        let max_node = self.nodes.last().map_or(0, |n| n.node.0 + 1);

        sink.update("max node", f64::from(max_node));
        sink.update("high time count", high_time_count as f64);
        sink.update("backtracking nodes", self.backtracking_nodes.len() as f64);
        sink.update("total time", self.nodes.iter().map(|n| n.time).sum());
        for phase in Phase::ALL {
            if let Some(category) = phase.category() {
                let seconds = self.nodes.iter().map(|n| n.category_time(category)).sum();
                sink.update(phase.name(), seconds);
            }
        }
    }
}

fn read_table(path: &Path) -> Result<String, ReplayError> {
    if !path.exists() {
        return Err(ReplayError::MissingTable(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Parse the per-node timing table.
///
/// # Errors
/// Returns [`ReplayError::BadHeader`] or [`ReplayError::MalformedRow`], the
/// latter also when row `i` does not hold node `i`.
pub fn parse_timing_table(content: &str, table: &str) -> Result<Vec<NodeRuntime>, ReplayError> {
    let mut lines = content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    expect_header(lines.next().map(|(_, l)| l), &TIMING_COLUMNS.join(","), table)?;

    let mut nodes = Vec::new();
    for (i, line) in lines {
        let malformed = |reason: String| ReplayError::MalformedRow {
            table: table.to_string(),
            line: i + 1,
            reason,
        };

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != TIMING_COLUMNS.len() {
            return Err(malformed(format!(
                "expected {} columns, found {}",
                TIMING_COLUMNS.len(),
                fields.len()
            )));
        }

        let float = |idx: usize| -> Result<f64, ReplayError> {
            fields[idx]
                .parse::<f64>()
                .map_err(|e| malformed(format!("{}: {e}", TIMING_COLUMNS[idx])))
        };

        let node = fields[0].parse::<u32>().map_err(|e| malformed(format!("node: {e}")))?;
        // Rows are exactly 0..N in order
        let expected = nodes.len();
        if usize::try_from(node).ok() != Some(expected) {
            return Err(malformed(format!("node {node} where node {expected} was expected")));
        }
        let entered_matching_loop = match fields[2] {
            "1" | "true" => true,
            "0" | "false" => false,
            other => return Err(malformed(format!("entered_matching_loop: {other:?}"))),
        };

        nodes.push(NodeRuntime {
            node: NodeIndex(node),
            time: float(1)?,
            entered_matching_loop,
            matching_time: float(3)?,
            matching_queue_time: float(4)?,
            theory_time: float(5)?,
        });
    }

    Ok(nodes)
}

/// Parse the backtrack table.
///
/// # Errors
/// Returns [`ReplayError::BadHeader`] or [`ReplayError::MalformedRow`], the
/// latter also when the nodes are not strictly ascending.
pub fn parse_backtracking_table(content: &str, table: &str) -> Result<Vec<NodeIndex>, ReplayError> {
    let mut lines = content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    expect_header(lines.next().map(|(_, l)| l), BACKTRACK_COLUMN, table)?;

    let mut nodes: Vec<NodeIndex> = Vec::new();
    for (i, line) in lines {
        let malformed = |reason: String| ReplayError::MalformedRow {
            table: table.to_string(),
            line: i + 1,
            reason,
        };
        let node = NodeIndex(line.trim().parse::<u32>().map_err(|e| malformed(e.to_string()))?);
        if nodes.last().is_some_and(|&last| last >= node) {
            return Err(malformed(format!("node {node} is not after the previous backtrack")));
        }
        nodes.push(node);
    }

    Ok(nodes)
}

fn expect_header(found: Option<&str>, expected: &str, table: &str) -> Result<(), ReplayError> {
    match found {
        Some(header) if header.trim() == expected => Ok(()),
        other => Err(ReplayError::BadHeader {
            table: table.to_string(),
            found: other.unwrap_or_default().to_string(),
        }),
    }
}
