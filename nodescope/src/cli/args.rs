//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::analysis::{HighTimeMetric, DEFAULT_HIGH_TIME_THRESHOLD};

#[derive(Parser)]
#[command(
    name = "nodescope",
    about = "Correlate expensive search nodes with backtracking",
    after_help = "\
EXAMPLES:
    nodescope ./profile                          Analyse a report with its recorded settings
    nodescope ./profile --threshold 0.01         Re-flag nodes at 10ms
    nodescope ./profile --metric matching        Flag by matching-loop time"
)]
pub struct Args {
    /// Report directory written by a profiled run
    #[arg(value_name = "DIR")]
    pub report: PathBuf,

    /// High-time threshold in seconds (default: the recorded one, else 0.005)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Metric compared against the threshold: total or matching
    #[arg(short, long)]
    pub metric: Option<HighTimeMetric>,

    /// Show only the N most frequent distances (0 = all)
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Also list every high-time node with its distance
    #[arg(long)]
    pub nodes: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Threshold to use, falling back to `recorded` and then the default.
    #[must_use]
    pub fn threshold_or(&self, recorded: Option<f64>) -> f64 {
        self.threshold.or(recorded).unwrap_or(DEFAULT_HIGH_TIME_THRESHOLD)
    }
}
