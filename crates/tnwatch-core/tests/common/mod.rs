//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tnwatch::config::{Config, NetworkConfig};
use tnwatch::credential::PRIVATE_KEY_VAR;

pub const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
/// Ethereum address of [`KEY`]
pub const ADDRESS: &str = "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23";
pub const STREAM_ID: &str = "stf37ad83c0b92c7419925b7633c0e62";
pub const PROVIDER: &str = "0x4710a8d8f0d845da110086812a32de6d90d7ff5c";

/// Network config pointing at the mock gateway
pub fn network(server: &MockServer, max_retries: u32) -> NetworkConfig {
    NetworkConfig {
        endpoint: server.uri(),
        timeout: Duration::from_secs(5),
        max_retries,
        retry_base_delay: Duration::from_millis(1),
    }
}

/// Full config against the mock gateway, values left unscaled
pub fn config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.network = network(server, 0);
    config.fetch.scale_factor = None;
    config
}

pub fn env_with_key() -> HashMap<String, String> {
    HashMap::from([(PRIVATE_KEY_VAR.to_string(), KEY.to_string())])
}

pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result,
    }))
}

pub fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {"code": code, "message": message},
    }))
}

pub async fn mount_health(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/rpc/v1"))
        .and(body_partial_json(json!({"method": "user.health"})))
        .respond_with(rpc_result(json!({"healthy": true})))
        .mount(server)
        .await;
}

pub async fn mount_stream(server: &MockServer, stream_type: &str) {
    Mock::given(method("POST"))
        .and(path("/rpc/v1"))
        .and(body_partial_json(json!({
            "method": "user.call",
            "params": {"action": "describe_stream"},
        })))
        .respond_with(rpc_result(json!({"stream_type": stream_type})))
        .mount(server)
        .await;
}

pub async fn mount_action(server: &MockServer, action: &str, rows: Value) {
    Mock::given(method("POST"))
        .and(path("/rpc/v1"))
        .and(body_partial_json(json!({
            "method": "user.call",
            "params": {"action": action},
        })))
        .respond_with(rpc_result(rows))
        .mount(server)
        .await;
}

/// Gateway with a healthy primitive stream serving `rows`
pub async fn primitive_gateway(rows: Value) -> MockServer {
    let server = MockServer::start().await;
    mount_health(&server).await;
    mount_stream(&server, "primitive").await;
    mount_action(&server, "get_record", rows).await;
    server
}
