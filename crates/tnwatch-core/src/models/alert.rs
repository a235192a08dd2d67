//! Alert data models

use serde::{Deserialize, Serialize};

/// Result of comparing the mean against the alert threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlertOutcome {
    /// The mean strictly exceeded the threshold
    Triggered {
        /// The metric value that triggered the alert
        value: f64,
        /// The threshold that was exceeded
        threshold: f64,
    },
    /// The mean was absent or did not exceed the threshold
    NotTriggered {
        /// The metric value, if one was computed
        value: Option<f64>,
        /// The threshold that was checked
        threshold: f64,
    },
}

impl AlertOutcome {
    /// Whether the alert fired
    pub fn is_triggered(&self) -> bool {
        matches!(self, Self::Triggered { .. })
    }

    /// The metric value the decision was made on
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Triggered { value, .. } => Some(*value),
            Self::NotTriggered { value, .. } => *value,
        }
    }

    /// Human-readable message for this outcome
    pub fn message(&self) -> String {
        match self {
            Self::Triggered { value, .. } => {
                format!("ALERT: Portfolio Value-at-Risk exceeds threshold! VaR: {value:.2}")
            }
            Self::NotTriggered {
                value: Some(value), ..
            } => format!("No alert triggered. VaR: {value:.2}"),
            Self::NotTriggered { value: None, .. } => "No alert triggered. VaR: n/a".to_string(),
        }
    }
}
