//! # Per-Node Runtime Recording
//!
//! Turns a set of phase stopwatches into a time-ordered log of per-node
//! snapshots.
//!
//! ## Boundary Protocol
//!
//! ```text
//!   push / backtrack
//!         │
//!         ▼
//!   scope_update()
//!     1. close the node-total interval, read its delta
//!     2. read + clear the delta of every phase stopwatch
//!     3. append NodeRuntime { node, ... }          (immutable from here on)
//!     4. node += 1, clear "entered matching loop"
//!     5. reopen the node-total interval
//! ```
//!
//! The node-total stopwatch is already running when the recorder is built,
//! so node 0 is measured from run start. The final node is only recorded if
//! someone calls [`NodeRuntimeRecorder::scope_update`] once more at teardown;
//! [`Profiler`](super::Profiler) does that when it finishes.

use log::trace;

use crate::domain::{NodeIndex, NodeRuntime, Phase};
use crate::timing::{Clock, MonotonicClock, Stopwatch};

/// Recorder of per-node phase timings
#[derive(Debug)]
pub struct NodeRuntimeRecorder<C = MonotonicClock> {
    /// Wall time of the current node; never stopped between boundaries
    node_total: Stopwatch<C>,
    /// One stopwatch per [`Phase`], indexed by `Phase::index`
    phases: [Stopwatch<C>; Phase::COUNT],
    current_node: NodeIndex,
    entered_matching_loop: bool,
    records: Vec<NodeRuntime>,
}

impl NodeRuntimeRecorder<MonotonicClock> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for NodeRuntimeRecorder<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone> NodeRuntimeRecorder<C> {
    /// Build a recorder whose stopwatches all read `clock`.
    pub fn with_clock(clock: C) -> Self {
        let mut node_total = Stopwatch::with_clock(clock.clone());
        node_total.start();
        Self {
            node_total,
            phases: std::array::from_fn(|_| Stopwatch::with_clock(clock.clone())),
            current_node: NodeIndex(0),
            entered_matching_loop: false,
            records: Vec::new(),
        }
    }

    /// Close the current node and open the next one.
    ///
    /// Returns the record that was just appended.
    pub fn scope_update(&mut self) -> &NodeRuntime {
        self.node_total.stop();
        let time = self.node_total.last_update_seconds();

        let deltas: [f64; Phase::COUNT] =
            std::array::from_fn(|i| self.phases[i].checkpoint_last_update());

        let record = NodeRuntime {
            node: self.current_node,
            time,
            matching_time: deltas[Phase::Matching.index()],
            matching_queue_time: deltas[Phase::MatchingQueue.index()],
            theory_time: deltas[Phase::Theory.index()],
            entered_matching_loop: self.entered_matching_loop,
        };

        trace!(
            target: "profiling_cdcl",
            "node: {}, entered loop: {}, time: {:.6}, matching: {:.6}",
            record.node,
            record.entered_matching_loop,
            record.time,
            record.matching_time
        );

        self.records.push(record);
        self.current_node = self.current_node.next();
        self.entered_matching_loop = false;
        self.node_total.reset_last_update();
        self.node_total.start();

        &self.records[self.records.len() - 1]
    }

    /// Node that the next boundary will close.
    #[must_use]
    pub fn current_node(&self) -> NodeIndex {
        self.current_node
    }

    /// Flag the current node as having entered the matching loop.
    pub fn mark_matching_loop_entered(&mut self) {
        self.entered_matching_loop = true;
    }

    #[must_use]
    pub fn entered_matching_loop(&self) -> bool {
        self.entered_matching_loop
    }

    #[must_use]
    pub fn phase(&self, phase: Phase) -> &Stopwatch<C> {
        &self.phases[phase.index()]
    }

    pub fn phase_mut(&mut self, phase: Phase) -> &mut Stopwatch<C> {
        &mut self.phases[phase.index()]
    }

    /// Stopwatch measuring whole-node time since recorder construction.
    #[must_use]
    pub fn node_total(&self) -> &Stopwatch<C> {
        &self.node_total
    }

    /// Records appended so far, in node order.
    #[must_use]
    pub fn records(&self) -> &[NodeRuntime] {
        &self.records
    }

    /// Move the log out, leaving the recorder with an empty one.
    pub fn take_records(&mut self) -> Vec<NodeRuntime> {
        std::mem::take(&mut self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::ManualClock;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_boundaries_number_records_consecutively() {
        let mut recorder = NodeRuntimeRecorder::with_clock(ManualClock::new());
        for _ in 0..5 {
            recorder.scope_update();
        }

        assert_eq!(recorder.current_node(), NodeIndex(5));
        let nodes: Vec<u32> = recorder.records().iter().map(|r| r.node.0).collect();
        assert_eq!(nodes, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_first_node_measured_from_construction() {
        let clock = ManualClock::new();
        let mut recorder = NodeRuntimeRecorder::with_clock(clock.clone());

        clock.advance_millis(7);
        let record = *recorder.scope_update();
        assert!(approx(record.time, 0.007));
    }

    #[test]
    fn test_phase_deltas_reset_per_node() {
        let clock = ManualClock::new();
        let mut recorder = NodeRuntimeRecorder::with_clock(clock.clone());

        recorder.phase_mut(Phase::Theory).start();
        clock.advance_millis(4);
        recorder.phase_mut(Phase::Theory).stop();
        clock.advance_millis(1);
        let first = *recorder.scope_update();

        clock.advance_millis(2);
        let second = *recorder.scope_update();

        assert!(approx(first.theory_time, 0.004));
        assert!(approx(first.time, 0.005));
        assert!(approx(second.theory_time, 0.0));
        assert!(approx(second.time, 0.002));
        // Lifetime totals survive boundaries
        assert!(approx(recorder.phase(Phase::Theory).seconds(), 0.004));
        assert!(approx(recorder.node_total().seconds(), 0.007));
    }

    #[test]
    fn test_phase_running_across_boundary_is_split() {
        let clock = ManualClock::new();
        let mut recorder = NodeRuntimeRecorder::with_clock(clock.clone());

        recorder.phase_mut(Phase::Matching).start();
        clock.advance_millis(3);
        let first = *recorder.scope_update();
        clock.advance_millis(2);
        recorder.phase_mut(Phase::Matching).stop();
        let second = *recorder.scope_update();

        assert!(approx(first.matching_time, 0.003));
        assert!(approx(second.matching_time, 0.002));
    }

    #[test]
    fn test_matching_loop_flag_cleared_at_boundary() {
        let mut recorder = NodeRuntimeRecorder::with_clock(ManualClock::new());

        recorder.mark_matching_loop_entered();
        assert!(recorder.scope_update().entered_matching_loop);
        assert!(!recorder.scope_update().entered_matching_loop);
    }

    #[test]
    fn test_take_records_keeps_node_counter() {
        let mut recorder = NodeRuntimeRecorder::with_clock(ManualClock::new());
        recorder.scope_update();
        recorder.scope_update();

        let taken = recorder.take_records();
        assert_eq!(taken.len(), 2);
        assert!(recorder.records().is_empty());
        assert_eq!(recorder.current_node(), NodeIndex(2));
    }
}
