//! High-time node selection.
//!
//! A node is expensive when the selected metric reaches the threshold. The
//! comparison is inclusive: a node recorded at exactly the threshold is
//! flagged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, HighTimeNode, NodeRuntime};

/// Default threshold in seconds.
pub const DEFAULT_HIGH_TIME_THRESHOLD: f64 = 0.005;

/// Which recorded time is compared against the threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighTimeMetric {
    /// Whole node time
    #[default]
    Total,
    /// Matching-loop time; nodes that never entered the loop are never flagged
    Matching,
}

impl HighTimeMetric {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HighTimeMetric::Total => "total",
            HighTimeMetric::Matching => "matching",
        }
    }
}

impl fmt::Display for HighTimeMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HighTimeMetric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "total" => Ok(HighTimeMetric::Total),
            "matching" | "mam" => Ok(HighTimeMetric::Matching),
            _ => Err(ConfigError::UnknownMetric(s.to_string())),
        }
    }
}

/// Threshold test for expensive nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighTimeFilter {
    threshold: f64,
    metric: HighTimeMetric,
}

impl HighTimeFilter {
    /// # Errors
    /// Returns [`ConfigError::InvalidThreshold`] for negative, NaN or infinite thresholds.
    pub fn new(threshold: f64, metric: HighTimeMetric) -> Result<Self, ConfigError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold, metric })
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn metric(&self) -> HighTimeMetric {
        self.metric
    }

    /// The flagged metric of `node`, or `None` when it is below the threshold.
    #[must_use]
    pub fn check(&self, node: &NodeRuntime) -> Option<HighTimeNode> {
        let seconds = match self.metric {
            HighTimeMetric::Total => node.time,
            HighTimeMetric::Matching if node.entered_matching_loop => node.matching_time,
            HighTimeMetric::Matching => return None,
        };
        (seconds >= self.threshold).then_some(HighTimeNode { node: node.node, seconds })
    }

    /// Flagged nodes of `nodes`, preserving their order.
    #[must_use]
    pub fn select(&self, nodes: &[NodeRuntime]) -> Vec<HighTimeNode> {
        nodes.iter().filter_map(|n| self.check(n)).collect()
    }
}

impl Default for HighTimeFilter {
    fn default() -> Self {
        Self { threshold: DEFAULT_HIGH_TIME_THRESHOLD, metric: HighTimeMetric::Total }
    }
}
