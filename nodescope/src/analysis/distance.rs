//! Backtrack distance correlation.
//!
//! Answers "does expensive reasoning at node N predict that the search
//! abandons that branch nearby?" by assigning every high-time node the signed
//! distance to its nearest backtrack event and counting how often each distance
//! occurs.
//!
//! # Algorithm
//!
//! Both inputs are ascending in node order, so a single forward sweep suffices:
//!
//! ```text
//! backtracks:   2 ─────────── 7 ──────────── 12
//! high-time:       3    5          9    10
//!                  │    │          │     │
//! prev/curr:     (2,7) (2,7)     (7,12) (7,12)
//! distance:        +1   -2         +2    -2
//! ```
//!
//! `prev` is the last backtrack before the node (or the first backtrack when
//! the node precedes all of them), `curr` the one after it. Past the last
//! backtrack both point at the last one. The smaller magnitude wins and ties
//! go to `prev`.
//!
//! # Performance
//!
//! O(|backtracks| + |high-time|) for the sweep, O(k log k) for sorting the
//! histogram where k = distinct distances.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{DistanceBucket, HighTimeNode, NodeDistance, NodeIndex};

/// Result of [`correlate_backtrack_distances`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    /// One entry per high-time node, in input order.
    pub distances: Vec<NodeDistance>,

    /// Distance frequencies, most frequent first; equal counts by ascending distance.
    pub histogram: Vec<DistanceBucket>,
}

impl Correlation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// The most frequent distance, if any node was correlated.
    #[must_use]
    pub fn most_common(&self) -> Option<DistanceBucket> {
        self.histogram.first().copied()
    }
}

/// Correlate high-time nodes with backtrack events.
///
/// # Arguments
/// * `backtracks` - Node indices at which the search backtracked, ascending
/// * `high_time` - Flagged nodes, ascending by node index
///
/// # Returns
/// Per-node minimal signed distances and their histogram. Empty when there
/// are no backtracks, since no node then has a defined distance.
#[must_use]
pub fn correlate_backtrack_distances(
    backtracks: &[NodeIndex],
    high_time: &[HighTimeNode],
) -> Correlation {
    debug_assert!(backtracks.windows(2).all(|w| w[0] < w[1]), "backtracks must be ascending");
    debug_assert!(
        high_time.windows(2).all(|w| w[0].node <= w[1].node),
        "high-time nodes must be ascending"
    );

    if backtracks.is_empty() {
        return Correlation::default();
    }

    let mut distances = Vec::with_capacity(high_time.len());
    let mut counts: HashMap<i64, usize> = HashMap::new();

    // Index of `prev`; `curr` is the element after it, or `prev` itself at the end
    let mut prev = 0;
    for high in high_time {
        while prev + 1 < backtracks.len() && backtracks[prev + 1] < high.node {
            prev += 1;
        }
        let curr = (prev + 1).min(backtracks.len() - 1);

        let back_dist = high.node.distance_from(backtracks[prev]);
        let front_dist = high.node.distance_from(backtracks[curr]);
        let distance = if back_dist.unsigned_abs() <= front_dist.unsigned_abs() {
            back_dist
        } else {
            front_dist
        };

        *counts.entry(distance).or_insert(0) += 1;
        distances.push(NodeDistance { node: high.node, distance, seconds: high.seconds });
    }

    let mut histogram: Vec<DistanceBucket> =
        counts.into_iter().map(|(distance, count)| DistanceBucket { distance, count }).collect();
    histogram.sort_unstable_by_key(|b| (Reverse(b.count), b.distance));

    Correlation { distances, histogram }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backtracks(nodes: &[u32]) -> Vec<NodeIndex> {
        nodes.iter().copied().map(NodeIndex).collect()
    }

    fn high(nodes: &[u32]) -> Vec<HighTimeNode> {
        nodes.iter().map(|&n| HighTimeNode { node: NodeIndex(n), seconds: 0.01 }).collect()
    }

    fn distances_of(c: &Correlation) -> Vec<i64> {
        c.distances.iter().map(|d| d.distance).collect()
    }

    #[test]
    fn test_nearest_previous_backtrack_wins() {
        let c = correlate_backtrack_distances(&backtracks(&[2, 7]), &high(&[3]));
        assert_eq!(distances_of(&c), vec![1]);
    }

    #[test]
    fn test_nearest_following_backtrack_wins() {
        let c = correlate_backtrack_distances(&backtracks(&[2, 7]), &high(&[5]));
        assert_eq!(distances_of(&c), vec![-2]);
    }

    #[test]
    fn test_tie_prefers_previous_backtrack() {
        let c = correlate_backtrack_distances(&backtracks(&[2, 6]), &high(&[4]));
        assert_eq!(distances_of(&c), vec![2]);
    }

    #[test]
    fn test_no_backtracks_yields_nothing() {
        let c = correlate_backtrack_distances(&[], &high(&[1, 2, 3]));
        assert!(c.is_empty());
        assert!(c.histogram.is_empty());
        assert_eq!(c.most_common(), None);
    }

    #[test]
    fn test_single_backtrack_is_plain_difference() {
        let c = correlate_backtrack_distances(&backtracks(&[10]), &high(&[0, 9, 10, 15]));
        assert_eq!(distances_of(&c), vec![-10, -1, 0, 5]);
    }

    #[test]
    fn test_nodes_before_first_and_after_last_backtrack() {
        let c = correlate_backtrack_distances(&backtracks(&[4, 8]), &high(&[1, 20]));
        assert_eq!(distances_of(&c), vec![-3, 12]);
    }

    #[test]
    fn test_node_on_backtrack_has_zero_distance() {
        let c = correlate_backtrack_distances(&backtracks(&[2, 7, 12]), &high(&[2, 7, 12]));
        assert_eq!(distances_of(&c), vec![0, 0, 0]);
    }

    #[test]
    fn test_sweep_over_many_backtracks() {
        let c = correlate_backtrack_distances(&backtracks(&[2, 7, 12]), &high(&[3, 5, 9, 10]));
        assert_eq!(distances_of(&c), vec![1, -2, 2, -2]);
    }

    #[test]
    fn test_histogram_sorted_by_count_then_distance() {
        let c = correlate_backtrack_distances(&backtracks(&[2, 7, 12]), &high(&[3, 5, 9, 10, 13]));
        // distances: 1, -2, 2, -2, 1
        assert_eq!(
            c.histogram,
            vec![
                DistanceBucket { distance: -2, count: 2 },
                DistanceBucket { distance: 1, count: 2 },
                DistanceBucket { distance: 2, count: 1 },
            ]
        );
        assert_eq!(c.most_common(), Some(DistanceBucket { distance: -2, count: 2 }));
    }

    #[test]
    fn test_distances_keep_metric_seconds() {
        let input = [HighTimeNode { node: NodeIndex(3), seconds: 0.25 }];
        let c = correlate_backtrack_distances(&backtracks(&[2, 7]), &input);
        assert_eq!(c.distances[0], NodeDistance { node: NodeIndex(3), distance: 1, seconds: 0.25 });
    }
}
