//! Profiler configuration

use std::path::PathBuf;

use crate::analysis::{HighTimeFilter, HighTimeMetric, DEFAULT_HIGH_TIME_THRESHOLD};
use crate::domain::ConfigError;

/// Settings for one profiled run
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilingConfig {
    /// Report directory; `None` keeps the report in memory only
    pub output_dir: Option<PathBuf>,
    /// Seconds at or above which a node counts as expensive
    pub high_time_threshold: f64,
    pub high_time_metric: HighTimeMetric,
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            high_time_threshold: DEFAULT_HIGH_TIME_THRESHOLD,
            high_time_metric: HighTimeMetric::Total,
        }
    }
}

impl ProfilingConfig {
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, seconds: f64) -> Self {
        self.high_time_threshold = seconds;
        self
    }

    #[must_use]
    pub fn with_metric(mut self, metric: HighTimeMetric) -> Self {
        self.high_time_metric = metric;
        self
    }

    /// Check the settings without building anything.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidThreshold`] for a negative or non-finite threshold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.high_time_filter().map(|_| ())
    }

    /// Build the high-time filter described by this configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidThreshold`] for a negative or non-finite threshold.
    pub fn high_time_filter(&self) -> Result<HighTimeFilter, ConfigError> {
        HighTimeFilter::new(self.high_time_threshold, self.high_time_metric)
    }
}
