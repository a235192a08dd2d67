//! Threshold evaluation

use tracing::{debug, info, warn};

use crate::models::{AlertOutcome, MetricSet, VAR_KEY};

/// Default alert threshold
pub const DEFAULT_THRESHOLD: f64 = 1000.0;

/// A "metric strictly above threshold" rule
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRule {
    /// Metric to watch
    pub metric: String,
    /// Value the metric must strictly exceed
    pub threshold: f64,
}

impl AlertRule {
    /// Rule on the mean, reported under [`VAR_KEY`]
    pub fn var(threshold: f64) -> Self {
        Self {
            metric: VAR_KEY.to_string(),
            threshold,
        }
    }

    /// Check if a value triggers this alert
    pub fn check(&self, value: f64) -> bool {
        value > self.threshold
    }

    /// Evaluate the rule against computed metrics
    pub fn evaluate(&self, metrics: &MetricSet) -> AlertOutcome {
        let value = metrics.get(&self.metric);

        let Some(value) = value else {
            debug!(metric = %self.metric, "No data for metric");
            return AlertOutcome::NotTriggered {
                value: None,
                threshold: self.threshold,
            };
        };

        if self.check(value) {
            warn!(metric = %self.metric, value, threshold = self.threshold, "Alert triggered");
            AlertOutcome::Triggered {
                value,
                threshold: self.threshold,
            }
        } else {
            info!(metric = %self.metric, value, threshold = self.threshold, "No alert triggered");
            AlertOutcome::NotTriggered {
                value: Some(value),
                threshold: self.threshold,
            }
        }
    }
}

impl Default for AlertRule {
    fn default() -> Self {
        Self::var(DEFAULT_THRESHOLD)
    }
}

/// Compare the mean in `metrics` against `threshold`
pub fn generate_alerts(metrics: &MetricSet, threshold: f64) -> AlertOutcome {
    AlertRule::var(threshold).evaluate(metrics)
}
