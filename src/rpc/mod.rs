pub mod client;
pub mod codec;
pub mod types;

pub use client::{EthClient, HttpRpcClient, JsonRpc, RpcError};
pub use types::{BlockTag, LogEntry, LogFilter};
