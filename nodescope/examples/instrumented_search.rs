//! N-queens backtracking search driving every profiler hook.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example instrumented_search -- 8 /tmp/queens-profile
//! cargo run -- /tmp/queens-profile --nodes
//! ```

use anyhow::{Context, Result};
use nodescope::domain::{MamOpcode, Phase};
use nodescope::profiling::{Profiler, ProfilingConfig};
use nodescope::stats::Statistics;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let n: usize = match args.next() {
        Some(arg) => arg.parse().context("board size must be a number")?,
        None => 8,
    };
    let output_dir = args.next().unwrap_or_else(|| "queens-profile".to_string());

    // Queens nodes are cheap; flag anything above 20µs
    let config = ProfilingConfig::default().with_output_dir(&output_dir).with_threshold(0.000_02);
    let mut profiler = Profiler::new(config)?;

    let mut queens = Vec::with_capacity(n);
    let mut solutions = 0;
    solve(&mut profiler, n, &mut queens, &mut solutions);

    let mut stats = Statistics::new();
    profiler.collect_statistics(&mut stats);
    print!("{stats}");

    let report = profiler.finish()?;
    println!("{n}-queens: {solutions} solutions, report in {output_dir}");
    if let Some(bucket) = report.correlation.most_common() {
        println!(
            "most common backtrack distance: {} ({} of {} high-time nodes)",
            bucket.distance,
            bucket.count,
            report.high_time_nodes.len()
        );
    }
    Ok(())
}

fn solve(profiler: &mut Profiler, n: usize, queens: &mut Vec<usize>, solutions: &mut usize) {
    if queens.len() == n {
        *solutions += 1;
        return;
    }

    for col in 0..n {
        if !is_safe(profiler, queens, col) {
            continue;
        }

        queens.push(col);
        profiler.scope_update();
        profiler.start_phase(Phase::Propagation);
        let free = propagate(profiler, n, queens);
        profiler.stop_phase(Phase::Propagation);

        if free == 0 && queens.len() < n {
            // Dead end: the next row has no candidate square
            queens.pop();
            let level = u32::try_from(queens.len()).unwrap_or(u32::MAX);
            profiler.backtracking_update(1, level);
            continue;
        }

        solve(profiler, n, queens, solutions);

        queens.pop();
        let level = u32::try_from(queens.len()).unwrap_or(u32::MAX);
        profiler.backtracking_update(1, level);
    }
}

/// Conflict check against every placed queen, timed as the matching loop.
fn is_safe(profiler: &mut Profiler, queens: &[usize], col: usize) -> bool {
    profiler.setup_mam();
    let row = queens.len();
    let mut safe = true;
    for (r, &c) in queens.iter().enumerate() {
        profiler.mam_loop_update();
        profiler.mam_case_update(MamOpcode::Compare);
        if c == col || row - r == col.abs_diff(c) {
            profiler.mam_case_update(MamOpcode::Yield1);
            safe = false;
            break;
        }
    }
    profiler.exit_mam();
    safe
}

/// Count the free squares of the next row, timed as theory propagation.
fn propagate(profiler: &mut Profiler, n: usize, queens: &[usize]) -> usize {
    profiler.start_phase(Phase::Theory);
    let row = queens.len();
    let free = (0..n)
        .filter(|&col| {
            queens.iter().enumerate().all(|(r, &c)| c != col && row - r != col.abs_diff(c))
        })
        .count();
    profiler.stop_phase(Phase::Theory);
    free
}
