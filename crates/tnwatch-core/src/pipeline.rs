//! The fetch, summarise and alert pipeline
//!
//! Every stage takes its inputs explicitly, so the pure part
//! ([`Pipeline::summarize`]) can be exercised without a network.

use serde::Serialize;
use tracing::info;

use crate::alerting::AlertRule;
use crate::calculator::calculate_metrics;
use crate::client::{NetworkClient, TnClient};
use crate::config::Config;
use crate::credential::{load_credential, CredentialSource};
use crate::error::Result;
use crate::fetcher::{fetch_index, fetch_records, FetchPolicy, IndexData};
use crate::models::{AlertOutcome, DateRange, MetricSet, Record, StreamLocator};

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Stream to fetch
    pub locator: StreamLocator,
    /// Dates to fetch
    pub range: DateRange,
    /// Value conversion
    pub policy: FetchPolicy,
    /// Alert rule applied to the metrics
    pub rule: AlertRule,
}

impl PipelineConfig {
    /// Resolve the configured strings into validated pipeline inputs
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            locator: StreamLocator::from_config(&config.stream.stream_id, &config.stream.provider)?,
            range: DateRange::new(config.stream.date_from, config.stream.date_to)?,
            policy: FetchPolicy::from(&config.fetch),
            rule: AlertRule::var(config.alerting.threshold),
        })
    }
}

/// Everything one run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Records that survived conversion, in network order
    pub records: Vec<Record>,
    /// Computed metrics
    pub metrics: MetricSet,
    /// Alert decision
    pub alert: AlertOutcome,
}

/// Single-shot pipeline over one stream
pub struct Pipeline<'a> {
    config: PipelineConfig,
    client: &'a dyn NetworkClient,
}

impl<'a> Pipeline<'a> {
    /// Create a new pipeline
    pub fn new(config: PipelineConfig, client: &'a dyn NetworkClient) -> Self {
        Self { config, client }
    }

    /// Fetch, summarise and evaluate. Any fetch failure aborts the run.
    pub async fn run(&self) -> Result<RunReport> {
        let records = fetch_records(
            self.client,
            &self.config.locator,
            &self.config.range,
            self.config.policy,
        )
        .await?;

        Ok(Self::summarize(records, &self.config.rule))
    }

    /// Fetch records and index levels of a composed stream
    pub async fn run_index(&self) -> Result<IndexData> {
        fetch_index(self.client, &self.config.locator, &self.config.range).await
    }

    /// Compute metrics and the alert outcome for already-fetched records
    pub fn summarize(records: Vec<Record>, rule: &AlertRule) -> RunReport {
        let metrics = calculate_metrics(&records);
        info!(metrics = %metrics, "Computed metrics");

        let alert = rule.evaluate(&metrics);

        RunReport {
            records,
            metrics,
            alert,
        }
    }

    /// The configuration this pipeline runs with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

/// Validate the configuration, load the credential, connect and run.
///
/// Configuration and credential problems surface before any network call.
pub async fn run_risk(config: &Config, source: &impl CredentialSource) -> Result<RunReport> {
    config.validate()?;
    let pipeline_config = PipelineConfig::from_config(config)?;
    let credential = load_credential(source)?;

    info!(stream = %pipeline_config.locator, range = %pipeline_config.range, "Starting risk run");
    let client = TnClient::connect(&config.network, &credential).await?;
    Pipeline::new(pipeline_config, &client).run().await
}

/// Like [`run_risk`], for the composed-stream index listing
pub async fn run_index(config: &Config, source: &impl CredentialSource) -> Result<IndexData> {
    config.validate()?;
    let pipeline_config = PipelineConfig::from_config(config)?;
    let credential = load_credential(source)?;

    let client = TnClient::connect(&config.network, &credential).await?;
    Pipeline::new(pipeline_config, &client).run_index().await
}
