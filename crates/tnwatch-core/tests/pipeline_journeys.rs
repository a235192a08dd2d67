//! End-to-end runs: credential, gateway, metrics and alert

mod common;

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::MockServer;

use common::*;
use tnwatch::client::{NetworkClient, StreamHandle};
use tnwatch::fetcher::{fetch_records, FetchPolicy};
use tnwatch::models::{AlertOutcome, DateRange, RawRecord, StreamKind, StreamLocator};
use tnwatch::output::{write_report, OutputFormat};
use tnwatch::pipeline::{run_index, run_risk};
use tnwatch::{Config, Error, Result};

#[tokio::test]
async fn mean_above_threshold_triggers_alert() {
    let server = primitive_gateway(json!([
        {"date_value": "2023-01-01", "value": "500"},
        {"date_value": "2023-01-15", "value": "1600"},
    ]))
    .await;

    let report = run_risk(&config(&server), &env_with_key()).await.unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.metrics.var(), Some(1050.0));
    assert_eq!(
        report.alert,
        AlertOutcome::Triggered {
            value: 1050.0,
            threshold: 1000.0
        }
    );
}

#[tokio::test]
async fn mean_below_threshold_does_not_trigger() {
    let server = primitive_gateway(json!([{"date_value": "2023-01-01", "value": "100"}])).await;

    let report = run_risk(&config(&server), &env_with_key()).await.unwrap();

    assert_eq!(
        report.alert,
        AlertOutcome::NotTriggered {
            value: Some(100.0),
            threshold: 1000.0
        }
    );
}

#[tokio::test]
async fn non_finite_values_are_excluded_from_the_mean() {
    let server = primitive_gateway(json!([
        {"date_value": "2023-01-01", "value": "1000"},
        {"date_value": "2023-01-02", "value": "2000"},
        {"date_value": "2023-01-03", "value": "NaN"},
    ]))
    .await;

    let report = run_risk(&config(&server), &env_with_key()).await.unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.metrics.var(), Some(1500.0));
}

#[tokio::test]
async fn no_records_means_no_metric_and_no_alert() {
    let server = primitive_gateway(json!([])).await;

    let report = run_risk(&config(&server), &env_with_key()).await.unwrap();

    assert!(report.metrics.is_empty());
    assert_eq!(report.alert.value(), None);
    assert!(!report.alert.is_triggered());
}

#[tokio::test]
async fn default_scale_factor_rescales_values() {
    let server = primitive_gateway(json!([
        {"date_value": "2023-01-01", "value": "0.000000000000002000"},
    ]))
    .await;
    let mut config = config(&server);
    config.fetch.scale_factor = Some(1e18);

    let report = run_risk(&config, &env_with_key()).await.unwrap();

    let mean = report.metrics.var().unwrap();
    assert!((mean - 2000.0).abs() < 1e-6);
    assert!(report.alert.is_triggered());
}

#[tokio::test]
async fn missing_credential_stops_before_any_network_call() {
    let server = primitive_gateway(json!([])).await;

    let err = run_risk(&config(&server), &HashMap::<String, String>::new()).await.unwrap_err();

    assert!(matches!(err, Error::MissingCredential(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_address_stops_before_any_network_call() {
    let server = primitive_gateway(json!([])).await;
    let mut config = config(&server);
    config.stream.provider = "0xnot-an-address".to_string();

    let err = run_risk(&config, &env_with_key()).await.unwrap_err();

    assert!(matches!(err, Error::InvalidAddress { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_gateway_fails_client_init() {
    let mut config = Config::default();
    config.network.endpoint = "http://127.0.0.1:9".to_string();
    config.network.timeout = Duration::from_secs(2);

    let err = run_risk(&config, &env_with_key()).await.unwrap_err();

    assert!(matches!(err, Error::ClientInit(_)));
}

#[tokio::test]
async fn index_run_returns_records_and_index() {
    let server = MockServer::start().await;
    mount_health(&server).await;
    mount_stream(&server, "composed").await;
    mount_action(
        &server,
        "get_record",
        json!([{"date_value": "2023-01-01", "value": "3.1"}]),
    )
    .await;
    mount_action(
        &server,
        "get_index",
        json!([{"date_value": "2023-01-01", "value": "104.2"}]),
    )
    .await;

    let data = run_index(&config(&server), &env_with_key()).await.unwrap();

    assert_eq!(data.records[0].value, "3.1");
    assert_eq!(data.index[0].value, "104.2");
}

#[tokio::test]
async fn json_output_carries_records_metrics_and_alert() {
    let server = primitive_gateway(json!([{"date_value": "2023-01-01", "value": "100"}])).await;
    let report = run_risk(&config(&server), &env_with_key()).await.unwrap();

    let mut out = Vec::new();
    write_report(&mut out, &report, OutputFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(json["records"][0]["value"], 100.0);
    assert_eq!(json["metrics"]["VaR"], 100.0);
    assert_eq!(json["alert"]["status"], "not_triggered");
}

/// In-memory network used to exercise the fetcher without HTTP.
/// Returns every row regardless of the requested range.
struct StaticNetwork {
    rows: Vec<RawRecord>,
    fail: bool,
}

struct StaticStream {
    locator: StreamLocator,
    rows: Vec<RawRecord>,
    fail: bool,
}

#[async_trait::async_trait]
impl NetworkClient for StaticNetwork {
    async fn load_stream(
        &self,
        locator: &StreamLocator,
        _kind: StreamKind,
    ) -> Result<Box<dyn StreamHandle>> {
        Ok(Box::new(StaticStream {
            locator: locator.clone(),
            rows: self.rows.clone(),
            fail: self.fail,
        }))
    }
}

#[async_trait::async_trait]
impl StreamHandle for StaticStream {
    fn locator(&self) -> &StreamLocator {
        &self.locator
    }

    fn kind(&self) -> StreamKind {
        StreamKind::Primitive
    }

    async fn get_records(&self, _range: &DateRange) -> Result<Vec<RawRecord>> {
        if self.fail {
            return Err(Error::fetch(self.locator.stream_id.as_str(), "records", "connection reset"));
        }
        Ok(self.rows.clone())
    }

    async fn get_index(&self, range: &DateRange) -> Result<Vec<RawRecord>> {
        self.get_records(range).await
    }
}

fn row(month: u32, day: u32, value: &str) -> RawRecord {
    RawRecord {
        date_value: NaiveDate::from_ymd_opt(2023, month, day).unwrap(),
        value: value.to_string(),
    }
}

#[tokio::test]
async fn fetcher_keeps_network_order_and_drops_rows_outside_range() {
    let network = StaticNetwork {
        rows: vec![row(1, 20, "3"), row(2, 1, "99"), row(1, 5, "1"), row(1, 6, "inf")],
        fail: false,
    };
    let locator = StreamLocator::from_config(STREAM_ID, PROVIDER).unwrap();
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
    )
    .unwrap();

    let records = fetch_records(&network, &locator, &range, FetchPolicy::raw())
        .await
        .unwrap();

    let values: Vec<f64> = records.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![3.0, 1.0]);
}

#[tokio::test]
async fn fetcher_propagates_collaborator_failure() {
    let network = StaticNetwork {
        rows: vec![],
        fail: true,
    };
    let locator = StreamLocator::from_config(STREAM_ID, PROVIDER).unwrap();
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
    )
    .unwrap();

    let err = fetch_records(&network, &locator, &range, FetchPolicy::raw())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Fetch { .. }));
}
