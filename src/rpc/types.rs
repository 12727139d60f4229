use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: &'a [Value],
}

/// JSON-RPC 2.0 response envelope: exactly one of `result` / `error` is
/// expected, but nodes are not always strict about it.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Block selector for `eth_getBlockByNumber` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Number(u64),
}

impl BlockTag {
    pub fn to_param(self) -> Value {
        match self {
            BlockTag::Latest => Value::String("latest".into()),
            BlockTag::Number(n) => Value::String(super::codec::to_quantity(n)),
        }
    }
}

/// `eth_getLogs` filter. `topics[1]` carries the padded wallet address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub from_block: String,
    pub to_block: String,
    pub topics: Vec<Option<String>>,
}

impl LogFilter {
    /// Logs in `[from, to]` whose first indexed argument is `topic`.
    pub fn indexed_address(from: u64, to: u64, topic: String) -> Self {
        Self {
            from_block: super::codec::to_quantity(from),
            to_block: super::codec::to_quantity(to),
            topics: vec![None, Some(topic)],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Emitting contract.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockHeader {
    pub timestamp: String,
}
