use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::U256;
use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

use super::codec::{balance_of_calldata, parse_u256, parse_u64};
use super::types::{BlockHeader, BlockTag, LogEntry, LogFilter, RpcRequest, RpcResponse};
use crate::models::WalletAddress;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("{method}: transport failure: {message}")]
    Transport { method: String, message: String },

    #[error("{method}: timed out after {after:?}")]
    Timeout { method: String, after: Duration },

    #[error("{method}: upstream error {code}: {message}")]
    Upstream {
        method: String,
        code: i64,
        message: String,
    },

    #[error("{method}: unexpected result: {message}")]
    Decode { method: String, message: String },
}

impl RpcError {
    pub fn method(&self) -> &str {
        match self {
            RpcError::Transport { method, .. }
            | RpcError::Timeout { method, .. }
            | RpcError::Upstream { method, .. }
            | RpcError::Decode { method, .. } => method,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RpcError::Transport { .. } => "transport",
            RpcError::Timeout { .. } => "timeout",
            RpcError::Upstream { .. } => "upstream",
            RpcError::Decode { .. } => "decode",
        }
    }

    pub fn decode(method: &str, message: impl Into<String>) -> Self {
        RpcError::Decode {
            method: method.to_string(),
            message: message.into(),
        }
    }
}

/// A single JSON-RPC endpoint. Implementations do not retry.
#[async_trait]
pub trait JsonRpc: Send + Sync {
    /// Issue `method(params)` and return the decoded `result` field
    /// (`Value::Null` when the node answered without one).
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;
}

// ---------------------------------------------------------------------------
// HTTP transport
// ---------------------------------------------------------------------------

/// JSON-RPC over HTTPS POST with a bounded per-request timeout.
#[derive(Debug)]
pub struct HttpRpcClient {
    http: Client,
    url: String,
    timeout: Duration,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    /// Rate limiters and some gateways answer 4xx/5xx with a proper JSON-RPC
    /// error body, so the envelope is decoded before the status is judged.
    async fn post(&self, method: &str, body: &RpcRequest<'_>) -> Result<Value, RpcError> {
        let resp = self
            .http
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest(method, e))?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| self.map_reqwest(method, e))?;

        let envelope = serde_json::from_slice::<RpcResponse>(&bytes);

        match (envelope, status.is_success()) {
            (Ok(RpcResponse { error: Some(err), .. }), _) => Err(RpcError::Upstream {
                method: method.to_string(),
                code: err.code,
                message: err.message,
            }),
            (Ok(envelope), true) => Ok(envelope.result.unwrap_or(Value::Null)),
            (_, false) => Err(RpcError::Transport {
                method: method.to_string(),
                message: format!("HTTP status {status}"),
            }),
            (Err(e), true) => Err(RpcError::Transport {
                method: method.to_string(),
                message: format!("invalid JSON-RPC envelope: {e}"),
            }),
        }
    }

    fn map_reqwest(&self, method: &str, e: reqwest::Error) -> RpcError {
        if e.is_timeout() {
            RpcError::Timeout {
                method: method.to_string(),
                after: self.timeout,
            }
        } else {
            RpcError::Transport {
                method: method.to_string(),
                message: e.without_url().to_string(),
            }
        }
    }
}

#[async_trait]
impl JsonRpc for HttpRpcClient {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params: &params,
        };

        counter!("rpc_requests_total", "method" => method.to_owned()).increment(1);
        tracing::debug!(method, id, "JSON-RPC request");

        let result = self.post(method, &body).await;

        if let Err(e) = &result {
            counter!(
                "rpc_failures_total",
                "method" => method.to_owned(),
                "kind" => e.kind()
            )
            .increment(1);
        }

        result
    }
}

// ---------------------------------------------------------------------------
// Typed eth_* calls
// ---------------------------------------------------------------------------

/// Typed wrapper exposing the handful of `eth_*` methods the collector needs.
#[derive(Clone)]
pub struct EthClient {
    rpc: Arc<dyn JsonRpc>,
}

impl EthClient {
    pub fn new(rpc: Arc<dyn JsonRpc>) -> Self {
        Self { rpc }
    }

    pub async fn block_number(&self) -> Result<u64, RpcError> {
        let method = "eth_blockNumber";
        let value = self.rpc.call(method, vec![]).await?;
        quantity_u64(method, &value)
    }

    pub async fn get_balance(&self, address: &WalletAddress) -> Result<U256, RpcError> {
        let method = "eth_getBalance";
        let value = self
            .rpc
            .call(method, vec![json!(address.as_str()), BlockTag::Latest.to_param()])
            .await?;
        quantity_u256(method, &value)
    }

    pub async fn get_transaction_count(&self, address: &WalletAddress) -> Result<U256, RpcError> {
        let method = "eth_getTransactionCount";
        let value = self
            .rpc
            .call(method, vec![json!(address.as_str()), BlockTag::Latest.to_param()])
            .await?;
        quantity_u256(method, &value)
    }

    /// Timestamp (Unix seconds) of the given block.
    pub async fn block_timestamp(&self, block: BlockTag) -> Result<i64, RpcError> {
        let method = "eth_getBlockByNumber";
        let value = self
            .rpc
            .call(method, vec![block.to_param(), json!(false)])
            .await?;

        if value.is_null() {
            return Err(RpcError::decode(method, format!("block {block:?} not found")));
        }

        let header: BlockHeader =
            serde_json::from_value(value).map_err(|e| RpcError::decode(method, e.to_string()))?;
        let ts = parse_u64(&header.timestamp).map_err(|e| RpcError::decode(method, e))?;
        i64::try_from(ts).map_err(|e| RpcError::decode(method, e.to_string()))
    }

    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, RpcError> {
        let method = "eth_getLogs";
        let value = self.rpc.call(method, vec![json!(filter)]).await?;

        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|e| RpcError::decode(method, e.to_string()))
    }

    /// `balanceOf(owner)` on a token contract via `eth_call`.
    pub async fn token_balance_of(
        &self,
        contract: &WalletAddress,
        owner: &WalletAddress,
    ) -> Result<U256, RpcError> {
        let method = "eth_call";
        let call = json!({
            "to": contract.as_str(),
            "data": balance_of_calldata(owner),
        });
        let value = self
            .rpc
            .call(method, vec![call, BlockTag::Latest.to_param()])
            .await?;
        quantity_u256(method, &value)
    }
}

fn quantity_str<'a>(method: &str, value: &'a Value) -> Result<&'a str, RpcError> {
    value
        .as_str()
        .ok_or_else(|| RpcError::decode(method, format!("expected hex string, got {value}")))
}

fn quantity_u64(method: &str, value: &Value) -> Result<u64, RpcError> {
    parse_u64(quantity_str(method, value)?).map_err(|e| RpcError::decode(method, e))
}

fn quantity_u256(method: &str, value: &Value) -> Result<U256, RpcError> {
    parse_u256(quantity_str(method, value)?).map_err(|e| RpcError::decode(method, e))
}
