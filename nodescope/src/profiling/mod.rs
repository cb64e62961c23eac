//! Profiling core modules
//!
//! This module contains the recording side of nodescope:
//! - Per-node runtime snapshots at every scope boundary
//! - Backtrack event log
//! - The `Profiler` hook surface called by the search engine
//! - Run configuration

pub mod backtracking;
pub mod config;
pub mod node_recorder;
pub mod profiler;

// Re-export common types
pub use backtracking::BacktrackTracker;
pub use config::ProfilingConfig;
pub use node_recorder::NodeRuntimeRecorder;
pub use profiler::Profiler;
