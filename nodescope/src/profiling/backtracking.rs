//! Backtrack event log

use log::trace;

use super::NodeRuntimeRecorder;
use crate::domain::NodeIndex;
use crate::timing::Clock;

/// Append-only log of the nodes at which the search backtracked
///
/// Entries are strictly ascending: each backtrack closes a node through the
/// recorder, so the next one necessarily lands on a later index.
#[derive(Debug, Default, Clone)]
pub struct BacktrackTracker {
    nodes: Vec<NodeIndex>,
    scopes_popped: u64,
}

impl BacktrackTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a backtrack at the recorder's current node, then close that node.
    ///
    /// `num_scopes` and `new_level` describe the backtrack for diagnostics;
    /// they do not change what is logged.
    pub fn backtracking_update<C: Clock + Clone>(
        &mut self,
        recorder: &mut NodeRuntimeRecorder<C>,
        num_scopes: u32,
        new_level: u32,
    ) {
        let node = recorder.current_node();
        trace!(
            target: "profiling_cdcl",
            "backtracking: {num_scopes}, new_lvl: {new_level}, node: {node}"
        );
        debug_assert!(self.nodes.last().is_none_or(|&last| last < node));

        self.nodes.push(node);
        self.scopes_popped += u64::from(num_scopes);
        recorder.scope_update();
    }

    /// Backtrack nodes in the order they were recorded.
    #[must_use]
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of scopes popped over all backtracks.
    #[must_use]
    pub fn scopes_popped(&self) -> u64 {
        self.scopes_popped
    }

    pub fn take_nodes(&mut self) -> Vec<NodeIndex> {
        std::mem::take(&mut self.nodes)
    }
}
