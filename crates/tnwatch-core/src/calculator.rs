//! Summary metrics over fetched records

use crate::models::{MetricSet, Record, VAR_KEY};

/// Reduce `records` to a [`MetricSet`].
///
/// The mean of all values is stored under [`VAR_KEY`]. With no records the key
/// is left out entirely rather than reported as zero.
pub fn calculate_metrics(records: &[Record]) -> MetricSet {
    let mut metrics = MetricSet::new();

    if !records.is_empty() {
        let sum: f64 = records.iter().map(|r| r.value).sum();
        metrics.insert(VAR_KEY, sum / records.len() as f64);
    }

    metrics
}
