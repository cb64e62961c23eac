//! # nodescope - Per-Node Profiling for Backtracking Search
//!
//! nodescope is an in-process instrumentation layer for backtracking search
//! engines (CDCL-style solvers with an e-matching loop). It records how much
//! time each search node spends in the matching loop, in queue-based
//! instantiation and in theory propagation, and correlates unusually expensive
//! nodes with the nodes where the search backtracks.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Search Engine                             │
//! │        (push / backtrack / matching loop / theory calls)        │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ synchronous hooks
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   nodescope (This Crate)                        │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │    Timing    │──▶│  Profiling   │──▶│   Analysis   │         │
//! │  │ (stopwatch)  │   │ (node log,   │   │ (high-time,  │         │
//! │  └──────────────┘   │  backtracks) │   │  distances)  │         │
//! │                     └──────────────┘   └──────┬───────┘         │
//! │                                               ▼                 │
//! │                     ┌──────────────┐   ┌──────────────┐         │
//! │                     │   Run Data   │◀──│    Export    │         │
//! │                     │   (replay)   │   │ (CSV, JSON)  │         │
//! │                     └──────────────┘   └──────────────┘         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`timing`]: Stopwatch with lifetime and since-last-reset totals, clock sources
//! - [`profiling`]: The [`Profiler`](profiling::Profiler) hook surface, per-node
//!   recorder, backtrack log, configuration
//! - [`analysis`]: High-time node selection and backtrack distance correlation
//! - [`export`]: Report sink trait and the directory writer
//! - [`run_data`]: Report model and replay loading
//! - [`stats`]: Named statistics sink
//! - [`cli`]: Command-line arguments for the replay binary
//! - [`domain`]: Core domain types and errors
//!
//! ## Typical Usage
//!
//! ```no_run
//! use nodescope::domain::Phase;
//! use nodescope::profiling::{Profiler, ProfilingConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut profiler = Profiler::new(ProfilingConfig::default().with_output_dir("profile"))?;
//!
//! profiler.setup_mam();
//! profiler.mam_loop_update();
//! profiler.exit_mam();
//! profiler.start_phase(Phase::Theory);
//! profiler.stop_phase(Phase::Theory);
//! profiler.scope_update();
//! profiler.backtracking_update(1, 0);
//!
//! let report = profiler.finish()?;
//! println!("{} nodes", report.nodes.len());
//! # Ok(())
//! # }
//! ```
//!
//! ```bash
//! # Re-analyse a written report with a different threshold
//! nodescope profile --threshold 0.01 --metric matching
//! ```

// Expose modules for testing
pub mod analysis;
pub mod cli;
pub mod domain;
pub mod export;
pub mod profiling;
pub mod run_data;
pub mod stats;
pub mod timing;
