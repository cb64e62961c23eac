//! # nodescope - Replay Entry Point
//!
//! Loads a report directory written by a profiled run, re-flags high-time
//! nodes with the chosen threshold and metric, and prints the backtrack
//! distance histogram.

// Counts are printed as percentages
#![allow(clippy::cast_precision_loss)]

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use nodescope::analysis::{Correlation, HighTimeFilter};
use nodescope::cli::Args;
use nodescope::run_data::RunData;
use nodescope::stats::Statistics;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.chain().any(|cause| cause.is::<nodescope::domain::ConfigError>()) {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let data = RunData::load(&args.report)
        .with_context(|| format!("Failed to load report from {}", args.report.display()))?;
    info!(
        "Loaded {} nodes and {} backtracks from {}",
        data.nodes.len(),
        data.backtracking_nodes.len(),
        args.report.display()
    );

    let recorded = data.summary.as_ref();
    let threshold = args.threshold_or(recorded.map(|s| s.high_time_threshold));
    let metric = args.metric.or(recorded.map(|s| s.high_time_metric)).unwrap_or_default();
    let filter = HighTimeFilter::new(threshold, metric)?;

    if data.backtracking_nodes.is_empty() {
        warn!("Report has no backtracks; distances are undefined");
    }

    let (high_time, correlation) = data.analyze(&filter);

    if !args.quiet {
        let mut stats = Statistics::new();
        data.collect_statistics(&filter, &mut stats);
        println!("{stats}");
        println!("high-time nodes: {} (threshold {threshold}s, metric {metric})", high_time.len());
    }

    print_histogram(&correlation, args.top);
    if args.nodes {
        print_node_distances(&correlation);
    }

    Ok(())
}

fn print_histogram(correlation: &Correlation, top: usize) {
    let total: usize = correlation.histogram.iter().map(|b| b.count).sum();
    if total == 0 {
        println!("no correlated nodes");
        return;
    }

    let shown = if top == 0 { correlation.histogram.len() } else { top };
    println!("{:>9}  {:>7}  {:>6}", "distance", "count", "share");
    for bucket in correlation.histogram.iter().take(shown) {
        let share = bucket.count as f64 / total as f64 * 100.0;
        println!("{:>9}  {:>7}  {share:>5.1}%", bucket.distance, bucket.count);
    }
}

fn print_node_distances(correlation: &Correlation) {
    println!();
    println!("{:>9}  {:>9}  {:>10}", "node", "distance", "seconds");
    for d in &correlation.distances {
        println!("{:>9}  {:>9}  {:>10.6}", d.node.0, d.distance, d.seconds);
    }
}
