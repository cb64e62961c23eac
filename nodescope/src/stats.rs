//! Named numeric statistics
//!
//! The profiler reports its end-of-run summary through [`StatisticsSink`], so
//! a host engine can route the numbers into its own statistics registry.
//! [`Statistics`] is the in-crate sink used by the CLI and the tests.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Receives named numeric summaries
pub trait StatisticsSink {
    /// Add `value` under `key`. Repeated updates of the same key accumulate.
    fn update(&mut self, key: &str, value: f64);
}

/// Sorted key/value statistics map
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    values: BTreeMap<String, f64>,
}

impl Statistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl StatisticsSink for Statistics {
    fn update(&mut self, key: &str, value: f64) {
        *self.values.entry(key.to_string()).or_insert(0.0) += value;
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.values.keys().map(String::len).max().unwrap_or(0);
        for (key, value) in self.iter() {
            // Counters print as integers, times with microsecond precision
            if value.fract() == 0.0 && value.abs() < 1e15 {
                writeln!(f, "{key:<width$}  {value:.0}")?;
            } else {
                writeln!(f, "{key:<width$}  {value:.6}")?;
            }
        }
        Ok(())
    }
}
