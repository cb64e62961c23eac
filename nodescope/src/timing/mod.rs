//! Interval timing primitives
//!
//! - `clock`: time sources (`MonotonicClock` for real runs, `ManualClock` for tests)
//! - `stopwatch`: start/stop/accumulate timer with a lifetime total and a
//!   since-last-reset delta, plus an RAII guard

pub mod clock;
pub mod stopwatch;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use stopwatch::{ScopedStopwatch, Stopwatch};
