//! Accumulating stopwatch with a lifetime total and a since-last-reset delta.
//!
//! One stopwatch serves both as the run-wide total for a phase and as the
//! per-node measurement: the lifetime total is never cleared by node
//! boundaries, the delta ("last update") is.
//!
//! Reads never mutate. [`Stopwatch::seconds`] and
//! [`Stopwatch::last_update_seconds`] include the still-open interval of a
//! running stopwatch without closing it. The only operation that both reads and
//! clears is [`Stopwatch::checkpoint_last_update`].

use std::time::Duration;

use super::clock::{Clock, MonotonicClock};

/// Start/stop interval timer
#[derive(Debug, Clone)]
pub struct Stopwatch<C = MonotonicClock> {
    clock: C,
    /// Clock reading at which the open interval began; `None` when stopped
    started_at: Option<Duration>,
    /// Closed intervals over the stopwatch's lifetime
    elapsed: Duration,
    /// Closed intervals since the last `reset_last_update`
    last_update: Duration,
}

impl Stopwatch<MonotonicClock> {
    /// Create a stopped stopwatch on the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for Stopwatch<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Stopwatch<C> {
    /// Create a stopped stopwatch reading `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self { clock, started_at: None, elapsed: Duration::ZERO, last_update: Duration::ZERO }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Open an interval. No-op while already running.
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
        }
    }

    /// Close the open interval, adding it to both totals. No-op while stopped.
    pub fn stop(&mut self) {
        if let Some(start) = self.started_at.take() {
            let change = self.clock.now().saturating_sub(start);
            self.elapsed += change;
            self.last_update += change;
        }
    }

    /// Zero both totals. A running stopwatch keeps running from now.
    pub fn reset(&mut self) {
        if self.started_at.is_some() {
            self.started_at = Some(self.clock.now());
        }
        self.elapsed = Duration::ZERO;
        self.last_update = Duration::ZERO;
    }

    /// Zero the since-last-reset total, leaving the lifetime total intact.
    ///
    /// Time already spent in the open interval is credited to the lifetime
    /// total first, so it is neither lost nor counted twice.
    pub fn reset_last_update(&mut self) {
        self.fold_open_interval();
        self.last_update = Duration::ZERO;
    }

    /// Read the since-last-reset total in seconds and zero it.
    ///
    /// The open interval, if any, is included in the reading and stays open.
    pub fn checkpoint_last_update(&mut self) -> f64 {
        self.fold_open_interval();
        let seconds = self.last_update.as_secs_f64();
        self.last_update = Duration::ZERO;
        seconds
    }

    /// Lifetime total, including the open interval.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed + self.open_interval()
    }

    /// Since-last-reset total, including the open interval.
    #[must_use]
    pub fn last_update(&self) -> Duration {
        self.last_update + self.open_interval()
    }

    #[must_use]
    pub fn seconds(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    #[must_use]
    pub fn last_update_seconds(&self) -> f64 {
        self.last_update().as_secs_f64()
    }

    fn open_interval(&self) -> Duration {
        self.started_at.map_or(Duration::ZERO, |start| self.clock.now().saturating_sub(start))
    }

    /// Move the open interval into the closed totals and reopen it at now.
    fn fold_open_interval(&mut self) {
        if let Some(start) = self.started_at {
            let now = self.clock.now();
            let change = now.saturating_sub(start);
            self.elapsed += change;
            self.last_update += change;
            self.started_at = Some(now);
        }
    }
}

/// Runs a stopwatch for the lifetime of the guard
///
/// ```
/// use nodescope::timing::{ScopedStopwatch, Stopwatch};
///
/// let mut sw = Stopwatch::new();
/// {
///     let _guard = ScopedStopwatch::new(&mut sw, false);
///     // timed work
/// }
/// assert!(!sw.is_running());
/// ```
pub struct ScopedStopwatch<'a, C: Clock = MonotonicClock> {
    stopwatch: &'a mut Stopwatch<C>,
}

impl<'a, C: Clock> ScopedStopwatch<'a, C> {
    /// Start `stopwatch`, zeroing it first when `reset` is set.
    pub fn new(stopwatch: &'a mut Stopwatch<C>, reset: bool) -> Self {
        if reset {
            stopwatch.reset();
        }
        stopwatch.start();
        Self { stopwatch }
    }
}

impl<C: Clock> Drop for ScopedStopwatch<'_, C> {
    fn drop(&mut self) {
        self.stopwatch.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::ManualClock;

    fn manual() -> (ManualClock, Stopwatch<ManualClock>) {
        let clock = ManualClock::new();
        let sw = Stopwatch::with_clock(clock.clone());
        (clock, sw)
    }

    #[test]
    fn test_intervals_accumulate() {
        let (clock, mut sw) = manual();

        sw.start();
        clock.advance_millis(3);
        sw.stop();
        clock.advance_millis(100); // stopped, not counted
        sw.start();
        clock.advance_millis(4);
        sw.stop();

        assert_eq!(sw.elapsed(), Duration::from_millis(7));
        assert_eq!(sw.last_update(), Duration::from_millis(7));
    }

    #[test]
    fn test_double_start_does_not_restart_interval() {
        let (clock, mut sw) = manual();

        sw.start();
        clock.advance_millis(2);
        sw.start();
        clock.advance_millis(3);
        sw.stop();

        assert_eq!(sw.elapsed(), Duration::from_millis(5));
    }

    #[test]
    fn test_stop_while_stopped_is_noop() {
        let (clock, mut sw) = manual();
        sw.stop();
        clock.advance_millis(10);
        sw.stop();
        assert_eq!(sw.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_reset_last_update_keeps_lifetime_total() {
        let (clock, mut sw) = manual();

        sw.start();
        clock.advance_millis(5);
        sw.stop();
        sw.reset_last_update();

        assert_eq!(sw.elapsed(), Duration::from_millis(5));
        assert_eq!(sw.last_update(), Duration::ZERO);
    }

    #[test]
    fn test_reads_include_open_interval_without_stopping() {
        let (clock, mut sw) = manual();

        sw.start();
        clock.advance_millis(6);
        assert_eq!(sw.elapsed(), Duration::from_millis(6));
        assert_eq!(sw.last_update(), Duration::from_millis(6));
        assert!(sw.is_running());

        clock.advance_millis(4);
        sw.stop();
        assert_eq!(sw.elapsed(), Duration::from_millis(10));
    }

    #[test]
    fn test_reset_does_not_stop_running_stopwatch() {
        let (clock, mut sw) = manual();

        sw.start();
        clock.advance_millis(8);
        sw.reset();
        assert!(sw.is_running());
        assert_eq!(sw.elapsed(), Duration::ZERO);

        clock.advance_millis(2);
        sw.stop();
        assert_eq!(sw.elapsed(), Duration::from_millis(2));
    }

    #[test]
    fn test_checkpoint_reads_and_clears_delta() {
        let (clock, mut sw) = manual();

        sw.start();
        clock.advance_millis(250);
        let first = sw.checkpoint_last_update();
        clock.advance_millis(500);
        let second = sw.checkpoint_last_update();

        assert!((first - 0.25).abs() < 1e-9);
        assert!((second - 0.5).abs() < 1e-9);
        assert!(sw.is_running());
        assert_eq!(sw.elapsed(), Duration::from_millis(750));
    }

    #[test]
    fn test_running_reset_last_update_does_not_double_count() {
        let (clock, mut sw) = manual();

        sw.start();
        clock.advance_millis(3);
        sw.reset_last_update();
        clock.advance_millis(2);
        sw.stop();

        assert_eq!(sw.last_update(), Duration::from_millis(2));
        assert_eq!(sw.elapsed(), Duration::from_millis(5));
    }

    #[test]
    fn test_scoped_stopwatch_stops_on_drop() {
        let (clock, mut sw) = manual();
        {
            let _guard = ScopedStopwatch::new(&mut sw, false);
            clock.advance_millis(9);
        }
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed(), Duration::from_millis(9));

        {
            let _guard = ScopedStopwatch::new(&mut sw, true);
            clock.advance_millis(1);
        }
        assert_eq!(sw.elapsed(), Duration::from_millis(1));
    }
}
