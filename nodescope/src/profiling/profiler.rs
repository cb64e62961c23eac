//! # Profiler Hook Surface
//!
//! The search engine owns one [`Profiler`] per run and calls its hooks
//! synchronously from its own thread:
//!
//! | Search event                 | Hook                                   |
//! |------------------------------|----------------------------------------|
//! | push a new scope             | [`Profiler::scope_update`]             |
//! | backtrack                    | [`Profiler::backtracking_update`]      |
//! | enter / leave matching loop  | [`Profiler::setup_mam`] / [`Profiler::exit_mam`] |
//! | matching loop iteration      | [`Profiler::mam_loop_update`]          |
//! | matching instruction         | [`Profiler::mam_case_update`]          |
//! | phase start / stop           | [`Profiler::start_phase`] / [`Profiler::stop_phase`] |
//!
//! ## Teardown
//!
//! [`Profiler::finish`] closes the last open node, correlates high-time nodes
//! with backtracks and hands the report to the configured sink. Dropping an
//! unfinished profiler runs the same sequence, so early exits from the search
//! still produce a report. The sequence runs at most once.

use log::{debug, error};
use std::collections::BTreeMap;

use nodescope_common::SCHEMA_VERSION;

use super::{BacktrackTracker, NodeRuntimeRecorder, ProfilingConfig};
use crate::analysis::{correlate_backtrack_distances, HighTimeFilter};
use crate::domain::{
    ConfigError, ExportError, HighTimeNode, MamOpcode, NodeIndex, NodeRuntime, Phase,
};
use crate::export::{ReportSink, ReportWriter};
use crate::run_data::{RunReport, RunSummary};
use crate::stats::StatisticsSink;
use crate::timing::{Clock, MonotonicClock, ScopedStopwatch, Stopwatch};

/// Per-run profiling state
pub struct Profiler<C: Clock + Clone = MonotonicClock> {
    filter: HighTimeFilter,
    recorder: NodeRuntimeRecorder<C>,
    backtracks: BacktrackTracker,
    /// Flagged nodes, ascending, collected as nodes close
    high_time_nodes: Vec<HighTimeNode>,
    mam_loop_iterations: u64,
    mam_case_counters: [u64; MamOpcode::COUNT],
    sink: Option<Box<dyn ReportSink>>,
    finished: bool,
}

impl Profiler<MonotonicClock> {
    /// Start profiling a run on the wall clock.
    ///
    /// # Errors
    /// Returns an error when the configured threshold is invalid.
    pub fn new(config: ProfilingConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock + Clone> Profiler<C> {
    /// Start profiling a run whose timers all read `clock`.
    ///
    /// When `config.output_dir` is set, the report is written there on finish.
    ///
    /// # Errors
    /// Returns an error when the configured threshold is invalid.
    pub fn with_clock(config: ProfilingConfig, clock: C) -> Result<Self, ConfigError> {
        let filter = config.high_time_filter()?;
        let sink = config
            .output_dir
            .map(|dir| Box::new(ReportWriter::new(dir)) as Box<dyn ReportSink>);

        debug!(
            "profiling started: threshold={}s metric={}",
            filter.threshold(),
            filter.metric()
        );

        Ok(Self {
            filter,
            recorder: NodeRuntimeRecorder::with_clock(clock),
            backtracks: BacktrackTracker::new(),
            high_time_nodes: Vec::new(),
            mam_loop_iterations: 0,
            mam_case_counters: [0; MamOpcode::COUNT],
            sink,
            finished: false,
        })
    }

    /// Replace the report sink.
    #[must_use]
    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    // ------------------------------------------------------------------
    // Hooks
    // ------------------------------------------------------------------

    /// A new scope was pushed: close the current node.
    pub fn scope_update(&mut self) {
        self.recorder.scope_update();
        self.note_closed_node();
    }

    /// The search backtracked `num_scopes` levels to `new_level`.
    pub fn backtracking_update(&mut self, num_scopes: u32, new_level: u32) {
        self.backtracks.backtracking_update(&mut self.recorder, num_scopes, new_level);
        self.note_closed_node();
    }

    /// Entering the matching loop.
    pub fn setup_mam(&mut self) {
        self.recorder.mark_matching_loop_entered();
        self.recorder.phase_mut(Phase::Matching).start();
    }

    /// Leaving the matching loop.
    pub fn exit_mam(&mut self) {
        self.recorder.phase_mut(Phase::Matching).stop();
    }

    pub fn mam_loop_update(&mut self) {
        self.mam_loop_iterations += 1;
    }

    pub fn mam_case_update(&mut self, opcode: MamOpcode) {
        self.mam_case_counters[opcode.index()] += 1;
    }

    pub fn start_phase(&mut self, phase: Phase) {
        self.recorder.phase_mut(phase).start();
    }

    pub fn stop_phase(&mut self, phase: Phase) {
        self.recorder.phase_mut(phase).stop();
    }

    /// Time `phase` until the returned guard is dropped.
    pub fn scoped_phase(&mut self, phase: Phase) -> ScopedStopwatch<'_, C> {
        ScopedStopwatch::new(self.recorder.phase_mut(phase), false)
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    #[must_use]
    pub fn phase(&self, phase: Phase) -> &Stopwatch<C> {
        self.recorder.phase(phase)
    }

    #[must_use]
    pub fn current_node(&self) -> NodeIndex {
        self.recorder.current_node()
    }

    #[must_use]
    pub fn records(&self) -> &[NodeRuntime] {
        self.recorder.records()
    }

    #[must_use]
    pub fn backtracking_nodes(&self) -> &[NodeIndex] {
        self.backtracks.nodes()
    }

    #[must_use]
    pub fn high_time_nodes(&self) -> &[HighTimeNode] {
        &self.high_time_nodes
    }

    #[must_use]
    pub fn mam_loop_iterations(&self) -> u64 {
        self.mam_loop_iterations
    }

    #[must_use]
    pub fn mam_case_count(&self, opcode: MamOpcode) -> u64 {
        self.mam_case_counters[opcode.index()]
    }

    /// Push the run's named totals into `sink`.
    #[allow(clippy::cast_precision_loss)]
    pub fn collect_statistics<S: StatisticsSink + ?Sized>(&self, sink: &mut S) {
        sink.update("max node", f64::from(self.current_node().0));
        sink.update("high time count", self.high_time_nodes.len() as f64);
        sink.update("backtracking nodes", self.backtracks.len() as f64);
        sink.update("scopes popped", self.backtracks.scopes_popped() as f64);
        sink.update("mam loop iterations", self.mam_loop_iterations as f64);
        sink.update("total time", self.recorder.node_total().seconds());
        for phase in Phase::ALL {
            sink.update(phase.name(), self.recorder.phase(phase).seconds());
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Close the final node and emit the report.
    ///
    /// # Errors
    /// Returns an error when the report sink fails. The in-memory report is
    /// lost in that case.
    pub fn finish(mut self) -> Result<RunReport, ExportError> {
        self.close()
    }

    fn note_closed_node(&mut self) {
        if let Some(high) = self.recorder.records().last().and_then(|r| self.filter.check(r)) {
            debug!(target: "profiling_cdcl", "high-time node {} ({:.6}s)", high.node, high.seconds);
            self.high_time_nodes.push(high);
        }
    }

    fn close(&mut self) -> Result<RunReport, ExportError> {
        debug_assert!(!self.finished, "profiler closed twice");
        self.finished = true;

        self.scope_update();

        let nodes = self.recorder.take_records();
        let backtracking_nodes = self.backtracks.take_nodes();
        let high_time_nodes = std::mem::take(&mut self.high_time_nodes);
        let correlation = correlate_backtrack_distances(&backtracking_nodes, &high_time_nodes);

        let summary = RunSummary {
            schema_version: SCHEMA_VERSION,
            node_count: nodes.len(),
            max_node: self.current_node().0,
            total_time: self.recorder.node_total().seconds(),
            phase_times: Phase::ALL
                .iter()
                .map(|&p| (p.name().to_string(), self.recorder.phase(p).seconds()))
                .collect(),
            backtrack_count: backtracking_nodes.len(),
            scopes_popped: self.backtracks.scopes_popped(),
            high_time_count: high_time_nodes.len(),
            high_time_threshold: self.filter.threshold(),
            high_time_metric: self.filter.metric(),
            mam_loop_iterations: self.mam_loop_iterations,
            opcode_counts: self.opcode_counts(),
        };

        debug!(
            "profiling finished: {} nodes, {} backtracks, {} high-time nodes",
            summary.node_count, summary.backtrack_count, summary.high_time_count
        );

        let report = RunReport { summary, nodes, backtracking_nodes, high_time_nodes, correlation };
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(&report)?;
        }
        Ok(report)
    }

    fn opcode_counts(&self) -> BTreeMap<String, u64> {
        MamOpcode::ALL
            .iter()
            .zip(self.mam_case_counters)
            .filter(|(_, count)| *count > 0)
            .map(|(op, count)| (op.name().to_string(), count))
            .collect()
    }
}

impl<C: Clock + Clone> Drop for Profiler<C> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.close() {
                error!("Failed to write profiling report: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Statistics;
    use crate::timing::ManualClock;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn profiler(clock: &ManualClock) -> Profiler<ManualClock> {
        Profiler::with_clock(ProfilingConfig::default(), clock.clone()).unwrap()
    }

    /// Sink that keeps every emitted report for inspection
    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<RunReport>>>);

    impl ReportSink for Captured {
        fn emit(&mut self, report: &RunReport) -> Result<(), ExportError> {
            self.0.borrow_mut().push(report.clone());
            Ok(())
        }
    }

    #[test]
    fn test_finish_flushes_final_node() {
        let clock = ManualClock::new();
        let mut p = profiler(&clock);

        p.scope_update();
        p.scope_update();
        let report = p.finish().unwrap();

        assert_eq!(report.nodes.len(), 3);
        assert_eq!(report.summary.max_node, 3);
    }

    #[test]
    fn test_backtracks_and_high_time_nodes_are_correlated() {
        let clock = ManualClock::new();
        let mut p = profiler(&clock);

        p.scope_update(); // 0
        p.scope_update(); // 1
        p.backtracking_update(1, 0); // 2
        clock.advance_millis(6);
        p.scope_update(); // 3: expensive
        p.scope_update(); // 4
        clock.advance_millis(10);
        p.scope_update(); // 5: expensive
        p.scope_update(); // 6
        p.backtracking_update(2, 0); // 7

        let report = p.finish().unwrap();
        let flagged: Vec<u32> = report.high_time_nodes.iter().map(|h| h.node.0).collect();
        assert_eq!(flagged, vec![3, 5]);
        let distances: Vec<i64> = report.correlation.distances.iter().map(|d| d.distance).collect();
        assert_eq!(distances, vec![1, -2]);
        assert_eq!(report.summary.backtrack_count, 2);
        assert_eq!(report.summary.scopes_popped, 3);
    }

    #[test]
    fn test_matching_loop_hooks() {
        let clock = ManualClock::new();
        let mut p = profiler(&clock);

        p.setup_mam();
        p.mam_loop_update();
        p.mam_loop_update();
        p.mam_case_update(MamOpcode::Bind2);
        clock.advance_millis(3);
        p.exit_mam();
        p.scope_update();

        let record = p.records()[0];
        assert!(record.entered_matching_loop);
        assert!((record.matching_time - 0.003).abs() < 1e-9);
        assert_eq!(p.mam_loop_iterations(), 2);
        assert_eq!(p.mam_case_count(MamOpcode::Bind2), 1);

        let report = p.finish().unwrap();
        assert_eq!(report.summary.opcode_counts.get("BIND2"), Some(&1));
        assert_eq!(report.summary.opcode_counts.len(), 1);
    }

    #[test]
    fn test_scoped_phase_times_theory() {
        let clock = ManualClock::new();
        let mut p = profiler(&clock);
        {
            let _theory = p.scoped_phase(Phase::Theory);
            clock.advance_millis(2);
        }
        p.scope_update();

        assert!((p.records()[0].theory_time - 0.002).abs() < 1e-9);
        assert!(!p.phase(Phase::Theory).is_running());
    }

    #[test]
    fn test_collect_statistics() {
        let clock = ManualClock::new();
        let mut p = profiler(&clock);
        clock.advance_millis(8);
        p.scope_update();
        p.backtracking_update(3, 1);

        let mut st = Statistics::new();
        p.collect_statistics(&mut st);

        assert_eq!(st.get("max node"), Some(2.0));
        assert_eq!(st.get("high time count"), Some(1.0));
        assert_eq!(st.get("backtracking nodes"), Some(1.0));
        assert_eq!(st.get("scopes popped"), Some(3.0));
        assert!(st.get("theory time").is_some());
    }

    #[test]
    fn test_drop_emits_report_once() {
        let clock = ManualClock::new();
        let captured = Captured::default();
        {
            let mut p = profiler(&clock).with_sink(captured.clone());
            p.scope_update();
        }
        let reports = captured.0.borrow();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].nodes.len(), 2);
    }

    #[test]
    fn test_finish_emits_report_once() {
        let clock = ManualClock::new();
        let captured = Captured::default();
        let p = profiler(&clock).with_sink(captured.clone());
        p.finish().unwrap();
        assert_eq!(captured.0.borrow().len(), 1);
    }

    #[test]
    fn test_invalid_threshold_is_rejected() {
        let config = ProfilingConfig::default().with_threshold(f64::INFINITY);
        assert!(Profiler::new(config).is_err());
    }
}
