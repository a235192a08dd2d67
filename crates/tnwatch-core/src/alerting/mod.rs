//! Alerting for tnwatch
//!
//! Compares computed metrics against a threshold and prints the outcome.

mod evaluator;
mod notifier;

pub use evaluator::{generate_alerts, AlertRule, DEFAULT_THRESHOLD};
pub use notifier::AlertNotifier;
