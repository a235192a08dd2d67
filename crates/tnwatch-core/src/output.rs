//! Rendering run results to stdout

use std::io::Write;

use serde::Serialize;

use crate::alerting::AlertNotifier;
use crate::error::Result;
use crate::fetcher::IndexData;
use crate::pipeline::RunReport;

/// Output format for command results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// One JSON object per run
    Json,
}

/// Write a risk run report
pub fn write_report(out: &mut impl Write, report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Text => {
            writeln!(out, "Fetched Data:")?;
            for record in &report.records {
                writeln!(out, "  {}  {}", record.date, record.value)?;
            }
            writeln!(out, "Risk Metrics: {}", report.metrics)?;
            AlertNotifier::new(&mut *out).notify(&report.alert)
        }
    }
}

/// Write raw records and index levels of a composed stream
pub fn write_index(out: &mut impl Write, data: &IndexData, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, data),
        OutputFormat::Text => {
            writeln!(out, "Inflation Data:")?;
            for record in &data.records {
                writeln!(out, "Date (DateValue): {}, Value: {}", record.date_value, record.value)?;
            }
            writeln!(out, "Index Data:")?;
            for index in &data.index {
                writeln!(
                    out,
                    "Date (DateValue): {}, Index Value: {}",
                    index.date_value, index.value
                )?;
            }
            Ok(())
        }
    }
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
