//! Domain types shared by the recorder, the analysis and the reports

use serde::{Deserialize, Serialize};
use std::fmt;

pub use nodescope_common::{MamOpcode, NodeIndex, NodeRuntime, TimingCategory};

/// Timed phase of the search
///
/// The first three phases are snapshotted into every [`NodeRuntime`]; the
/// rest only contribute run-wide totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Matching loop
    Matching,
    /// Queue-based instantiation
    MatchingQueue,
    /// Theory propagation
    Theory,
    /// Whole propagation round, theories included
    Propagation,
    /// E-matching outside the matching loop proper
    Ematching,
    /// Conflict analysis and resolution
    Conflict,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Matching,
        Phase::MatchingQueue,
        Phase::Theory,
        Phase::Propagation,
        Phase::Ematching,
        Phase::Conflict,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// The per-node category this phase is recorded under, if any.
    #[must_use]
    pub const fn category(self) -> Option<TimingCategory> {
        match self {
            Phase::Matching => Some(TimingCategory::Matching),
            Phase::MatchingQueue => Some(TimingCategory::MatchingQueue),
            Phase::Theory => Some(TimingCategory::Theory),
            Phase::Propagation | Phase::Ematching | Phase::Conflict => None,
        }
    }

    /// Statistic name for the cumulative time of this phase.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Matching => "matching time",
            Phase::MatchingQueue => "matching queue time",
            Phase::Theory => "theory time",
            Phase::Propagation => "propagation time",
            Phase::Ematching => "ematching time",
            Phase::Conflict => "conflict time",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node whose recorded time reached the high-time threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighTimeNode {
    pub node: NodeIndex,
    /// The metric that was compared against the threshold, in seconds
    pub seconds: f64,
}

/// Distance from a high-time node to its nearest backtrack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDistance {
    pub node: NodeIndex,
    /// `node - backtrack_node`; negative when the backtrack comes later
    pub distance: i64,
    pub seconds: f64,
}

/// Histogram bucket: how many high-time nodes sit at `distance`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceBucket {
    pub distance: i64,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_node_phases_have_categories() {
        let recorded: Vec<_> = Phase::ALL.iter().filter_map(|p| p.category()).collect();
        assert_eq!(recorded, TimingCategory::ALL.to_vec());
    }

    #[test]
    fn test_phase_index_matches_table_order() {
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
    }
}
