//! Metrics data models

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key under which the mean of the fetched values is reported.
///
/// The name is historical: the value is a plain arithmetic mean, not a
/// Value-at-Risk estimate.
pub const VAR_KEY: &str = "VaR";

/// Named scalar metrics computed over one fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet(BTreeMap<String, f64>);

impl MetricSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a metric, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Look up a metric
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// The mean, reported under [`VAR_KEY`]
    pub fn var(&self) -> Option<f64> {
        self.get(VAR_KEY)
    }

    /// Number of metrics present
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no metric was computed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate metrics in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for MetricSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}
