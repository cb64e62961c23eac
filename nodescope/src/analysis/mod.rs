//! Analysis logic for recorded runs
//!
//! This module contains pure logic over the recorded node log, separated from
//! the recording hooks and from the report writers:
//! - `high_time`: decide which nodes count as expensive
//! - `distance`: correlate expensive nodes with backtrack events

pub mod distance;
pub mod high_time;

pub use distance::{correlate_backtrack_distances, Correlation};
pub use high_time::{HighTimeFilter, HighTimeMetric, DEFAULT_HIGH_TIME_THRESHOLD};
