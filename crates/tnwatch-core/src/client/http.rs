//! JSON-RPC client for the stream network gateway

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use super::retry::RetryPolicy;
use super::signer::Signer;
use super::{NetworkClient, StreamHandle};
use crate::config::NetworkConfig;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::models::{DateRange, RawRecord, StreamKind, StreamLocator};

const RPC_PATH: &str = "rpc/v1";
const NAMESPACE: &str = "main";

/// HTTP client for the stream network
#[derive(Clone)]
pub struct TnClient {
    http: Client,
    rpc_url: Url,
    signer: Arc<Signer>,
    retry: RetryPolicy,
    next_id: Arc<AtomicU64>,
}

impl TnClient {
    /// Build a client and perform the health handshake.
    pub async fn connect(config: &NetworkConfig, credential: &Credential) -> Result<Self> {
        let signer = Signer::from_credential(credential)?;

        let rpc_url = rpc_url(&config.endpoint)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("tnwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::client_init(e.to_string()))?;

        let client = Self {
            http,
            rpc_url,
            signer: Arc::new(signer),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                base_delay: config.retry_base_delay,
            },
            next_id: Arc::new(AtomicU64::new(1)),
        };

        let health = client
            .rpc("user.health", json!({}))
            .await
            .map_err(|e| Error::client_init(e.to_string()))?;
        if health.get("healthy").and_then(Value::as_bool) == Some(false) {
            return Err(Error::client_init("gateway reports unhealthy"));
        }

        info!(
            endpoint = %client.rpc_url,
            sender = %client.address(),
            "Connected to stream network"
        );
        Ok(client)
    }

    /// Address requests are signed as
    pub fn address(&self) -> &str {
        self.signer.address()
    }

    /// Call a stream action
    async fn call_action(&self, action: &str, inputs: Value) -> std::result::Result<Value, CallError> {
        self.rpc(
            "user.call",
            json!({
                "namespace": NAMESPACE,
                "action": action,
                "inputs": inputs,
            }),
        )
        .await
    }

    async fn rpc(&self, method: &str, params: Value) -> std::result::Result<Value, CallError> {
        self.retry
            .run(method, CallError::is_retryable, || self.rpc_once(method, &params))
            .await
    }

    async fn rpc_once(&self, method: &str, params: &Value) -> std::result::Result<Value, CallError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let body = serde_json::to_vec(&request).map_err(CallError::permanent)?;
        let signature = self.signer.sign(&body).map_err(CallError::permanent)?;

        debug!(method, id = request.id, "Sending RPC request");

        let response = self
            .http
            .post(self.rpc_url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("x-tn-sender", self.signer.address())
            .header("x-tn-signature", signature)
            .body(body)
            .send()
            .await
            .map_err(CallError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = format!("gateway returned {status}: {text}");
            return Err(if is_retryable_status(status) {
                CallError::transient(message)
            } else {
                CallError::permanent(message)
            });
        }

        let reply: RpcResponse = response.json().await.map_err(CallError::permanent)?;
        match (reply.result, reply.error) {
            (_, Some(err)) => Err(CallError::permanent(format!(
                "rpc error {}: {}",
                err.code, err.message
            ))),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }

    async fn fetch(
        &self,
        action: &str,
        locator: &StreamLocator,
        range: &DateRange,
    ) -> std::result::Result<Vec<RawRecord>, CallError> {
        let result = self
            .call_action(
                action,
                json!({
                    "data_provider": locator.data_provider.as_str(),
                    "stream_id": locator.stream_id.as_str(),
                    "date_from": range.from().to_string(),
                    "date_to": range.to().to_string(),
                }),
            )
            .await?;

        if result.is_null() {
            return Ok(Vec::new());
        }
        let rows: Vec<WireRecord> = serde_json::from_value(result).map_err(CallError::permanent)?;
        Ok(rows.into_iter().map(RawRecord::from).collect())
    }
}

#[async_trait::async_trait]
impl NetworkClient for TnClient {
    async fn load_stream(
        &self,
        locator: &StreamLocator,
        kind: StreamKind,
    ) -> Result<Box<dyn StreamHandle>> {
        let stream = locator.stream_id.to_string();
        let description = self
            .call_action(
                "describe_stream",
                json!({
                    "data_provider": locator.data_provider.as_str(),
                    "stream_id": locator.stream_id.as_str(),
                }),
            )
            .await
            .map_err(|e| Error::fetch(&stream, "stream", e))?;

        let found: Option<StreamKind> = description
            .get("stream_type")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| Error::fetch(&stream, "stream", e))?;

        match found {
            None => Err(Error::fetch(&stream, "stream", "stream not found")),
            Some(actual) if actual != kind => Err(Error::fetch(
                &stream,
                "stream",
                format!("stream is {actual}, expected {kind}"),
            )),
            Some(_) => {
                info!(stream = %locator, %kind, "Loaded stream");
                Ok(Box::new(TnStream {
                    client: self.clone(),
                    locator: locator.clone(),
                    kind,
                }))
            }
        }
    }
}

/// A stream loaded through [`TnClient`]
struct TnStream {
    client: TnClient,
    locator: StreamLocator,
    kind: StreamKind,
}

#[async_trait::async_trait]
impl StreamHandle for TnStream {
    fn locator(&self) -> &StreamLocator {
        &self.locator
    }

    fn kind(&self) -> StreamKind {
        self.kind
    }

    async fn get_records(&self, range: &DateRange) -> Result<Vec<RawRecord>> {
        self.client
            .fetch("get_record", &self.locator, range)
            .await
            .map_err(|e| Error::fetch(self.locator.stream_id.as_str(), "records", e))
    }

    async fn get_index(&self, range: &DateRange) -> Result<Vec<RawRecord>> {
        self.client
            .fetch("get_index", &self.locator, range)
            .await
            .map_err(|e| Error::fetch(self.locator.stream_id.as_str(), "index", e))
    }
}

/// Failure of a single gateway call, before it is attributed to a stream
#[derive(Debug)]
struct CallError {
    message: String,
    retryable: bool,
}

impl CallError {
    fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    fn permanent(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
            retryable: false,
        }
    }

    fn transport(err: reqwest::Error) -> Self {
        Self {
            retryable: err.is_timeout() || err.is_connect() || err.is_request(),
            message: err.to_string(),
        }
    }

    fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// `{endpoint}/rpc/v1`, keeping any path prefix on the endpoint
fn rpc_url(endpoint: &str) -> Result<Url> {
    let invalid = |e: url::ParseError| Error::client_init(format!("invalid endpoint '{endpoint}': {e}"));

    let mut base = Url::parse(endpoint).map_err(invalid)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(RPC_PATH).map_err(invalid)
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Values arrive as decimal strings, but plain JSON numbers are tolerated.
#[derive(Deserialize)]
struct WireRecord {
    date_value: NaiveDate,
    value: Value,
}

impl From<WireRecord> for RawRecord {
    fn from(row: WireRecord) -> Self {
        let value = match row.value {
            Value::String(text) => text,
            other => other.to_string(),
        };
        RawRecord {
            date_value: row.date_value,
            value,
        }
    }
}
