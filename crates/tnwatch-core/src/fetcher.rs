//! Record fetching and post-processing

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::NetworkClient;
use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::models::{DateRange, RawRecord, Record, StreamKind, StreamLocator};

/// How fetched values are turned into usable numbers
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FetchPolicy {
    /// Multiplier applied to every surviving value
    pub scale_factor: Option<f64>,
}

impl FetchPolicy {
    /// Leave values unscaled
    pub fn raw() -> Self {
        Self { scale_factor: None }
    }

    /// Multiply every value by `factor`
    pub fn scaled(factor: f64) -> Self {
        Self {
            scale_factor: Some(factor),
        }
    }
}

impl From<&FetchConfig> for FetchPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            scale_factor: config.scale_factor,
        }
    }
}

/// Raw records and index levels of a composed stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexData {
    /// Underlying records
    pub records: Vec<RawRecord>,
    /// Index levels for the same dates
    pub index: Vec<RawRecord>,
}

/// Fetch the records of a primitive stream for `range`.
///
/// Values that cannot be represented as finite numbers are skipped with a
/// warning; everything else is scaled per `policy`. Network order is kept.
pub async fn fetch_records(
    client: &dyn NetworkClient,
    locator: &StreamLocator,
    range: &DateRange,
    policy: FetchPolicy,
) -> Result<Vec<Record>> {
    info!(stream = %locator.stream_id, provider = %locator.data_provider, %range, "Fetching stream");

    let stream = client.load_stream(locator, StreamKind::Primitive).await?;
    let raw = stream.get_records(range).await?;

    let records = process_records(&raw, range, policy)?;
    info!(
        stream = %stream.locator(),
        kind = %stream.kind(),
        received = raw.len(),
        kept = records.len(),
        "Fetched records"
    );
    Ok(records)
}

/// Fetch raw records and index levels of a composed stream, unmodified
pub async fn fetch_index(
    client: &dyn NetworkClient,
    locator: &StreamLocator,
    range: &DateRange,
) -> Result<IndexData> {
    info!(stream = %locator.stream_id, provider = %locator.data_provider, %range, "Fetching composed stream");

    let stream = client.load_stream(locator, StreamKind::Composed).await?;
    let records = stream.get_records(range).await?;
    let index = stream.get_index(range).await?;

    info!(records = records.len(), index = index.len(), "Fetched index data");
    Ok(IndexData { records, index })
}

/// Convert, filter and scale raw records.
///
/// Rows dated outside `range` and rows failing with a recoverable error are
/// skipped; any other error aborts processing.
pub fn process_records(
    raw: &[RawRecord],
    range: &DateRange,
    policy: FetchPolicy,
) -> Result<Vec<Record>> {
    let mut records = Vec::with_capacity(raw.len());
    for row in raw {
        if !range.contains(row.date_value) {
            warn!(date = %row.date_value, %range, "Skipping record outside the requested range");
            continue;
        }
        match convert(row, policy) {
            Ok(record) => {
                debug!(date = %record.date, value = record.value, "Processed record");
                records.push(record);
            }
            Err(e) if e.is_recoverable() => warn!(error = %e, "Skipping record"),
            Err(e) => return Err(e),
        }
    }
    Ok(records)
}

fn convert(row: &RawRecord, policy: FetchPolicy) -> Result<Record> {
    let mut record = row.to_record()?;
    if let Some(factor) = policy.scale_factor {
        record.value *= factor;
        if !record.value.is_finite() {
            return Err(Error::NonFiniteValue {
                date: row.date_value.to_string(),
                value: row.value.clone(),
            });
        }
    }
    Ok(record)
}
