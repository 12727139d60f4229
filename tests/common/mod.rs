use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use walletscope::api::router::create_router;
use walletscope::ingestion::{CollectorConfig, FirstActivityFallback, SignalCollector};
use walletscope::models::{EligibilityRequirements, WalletAddress};
use walletscope::rpc::{HttpRpcClient, JsonRpc};
use walletscope::services::{ReportService, RequirementsStore};
use walletscope::AppState;

pub const WALLET: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
pub const NFT_CONTRACT: &str = "0x922da3512e2bebbe32bcce59adf7e6759fb8cea2";
pub const CUTOFF: i64 = 1_708_905_600;

pub const LATEST_BLOCK: u64 = 0x80_0000;
pub const ANCHOR_BLOCK: u64 = 0x70_0000;

/// Blocks from here on carry "recent" timestamps; below it, pre-cutoff ones.
const RECENT_ERA_START: u64 = 0x7f_0000;
const RECENT_ERA_TS: i64 = 1_760_000_000;
const EARLY_ERA_TS: i64 = 1_700_000_000;

/// What the mock node does with one request.
#[derive(Clone)]
pub enum MockReply {
    Result(Value),
    RpcError(i64, String),
    HttpStatus(StatusCode),
    /// Non-2xx status carrying a JSON-RPC error body, as rate limiters send.
    HttpRpcError(StatusCode, i64, String),
    Delayed(Duration, Value),
}

type Responder = Arc<dyn Fn(&[Value]) -> MockReply + Send + Sync>;

/// Programmable JSON-RPC node. Methods without a responder answer with
/// `-32601 method not found`.
#[derive(Clone, Default)]
pub struct MockChain {
    responders: HashMap<String, Responder>,
}

#[allow(dead_code)]
impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with<F>(mut self, method: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> MockReply + Send + Sync + 'static,
    {
        self.responders.insert(method.to_string(), Arc::new(f));
        self
    }

    pub fn reply(self, method: &str, value: Value) -> Self {
        self.respond_with(method, move |_| MockReply::Result(value.clone()))
    }

    pub fn fail(self, method: &str) -> Self {
        self.respond_with(method, |_| MockReply::RpcError(-32000, "internal error".into()))
    }

    pub fn http_error(self, method: &str, status: StatusCode) -> Self {
        self.respond_with(method, move |_| MockReply::HttpStatus(status))
    }

    pub fn delay(self, method: &str, after: Duration, value: Value) -> Self {
        self.respond_with(method, move |_| MockReply::Delayed(after, value.clone()))
    }

    pub async fn spawn(self) -> MockServer {
        let calls = Arc::new(AtomicUsize::new(0));
        let node = Arc::new(MockNode {
            responders: self.responders,
            calls: calls.clone(),
        });

        let app = Router::new().route("/", post(handle)).with_state(node);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockServer {
            url: format!("http://{addr}"),
            calls,
        }
    }
}

struct MockNode {
    responders: HashMap<String, Responder>,
    calls: Arc<AtomicUsize>,
}

pub struct MockServer {
    pub url: String,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockServer {
    /// Number of JSON-RPC requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn handle(State(node): State<Arc<MockNode>>, Json(req): Json<Value>) -> Response {
    node.calls.fetch_add(1, Ordering::SeqCst);

    let id = req["id"].clone();
    let method = req["method"].as_str().unwrap_or_default();
    let params = req["params"].as_array().cloned().unwrap_or_default();

    let reply = match node.responders.get(method) {
        Some(responder) => responder(&params),
        None => MockReply::RpcError(-32601, format!("method {method} not found")),
    };

    match reply {
        MockReply::Result(result) => Json(json!({ "jsonrpc": "2.0", "id": id, "result": result })).into_response(),
        MockReply::Delayed(after, result) => {
            tokio::time::sleep(after).await;
            Json(json!({ "jsonrpc": "2.0", "id": id, "result": result })).into_response()
        }
        MockReply::RpcError(code, message) => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message },
        }))
        .into_response(),
        MockReply::HttpStatus(status) => status.into_response(),
        MockReply::HttpRpcError(status, code, message) => (
            status,
            Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": code, "message": message },
            })),
        )
            .into_response(),
    }
}

// ---------------------------------------------------------------------------
// Canned chain data
// ---------------------------------------------------------------------------

pub fn quantity(n: u128) -> Value {
    json!(format!("{n:#x}"))
}

fn parse_quantity(v: &Value) -> u64 {
    let s = v.as_str().unwrap_or("0x0");
    u64::from_str_radix(s.trim_start_matches("0x"), 16).unwrap_or(0)
}

/// Deterministic block timestamps: blocks near the head are recent, blocks
/// near the historical anchor predate the cutoff.
pub fn block_timestamp(n: u64) -> i64 {
    if n >= RECENT_ERA_START {
        RECENT_ERA_TS + (n - RECENT_ERA_START) as i64
    } else {
        EARLY_ERA_TS + n.saturating_sub(ANCHOR_BLOCK) as i64
    }
}

fn log(contract: &str, block: u64) -> Value {
    json!({
        "address": contract,
        "blockNumber": format!("{block:#x}"),
        "transactionHash": format!("0x{:064x}", block),
        "topics": [
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
            format!("0x{:0>64}", &WALLET[2..]),
        ],
    })
}

pub const RECENT_CONTRACT_A: &str = "0x1111111111111111111111111111111111111111";
pub const RECENT_CONTRACT_B: &str = "0x2222222222222222222222222222222222222222";
pub const HISTORICAL_LOG_BLOCK: u64 = ANCHOR_BLOCK + 2;
pub const RECENT_LOG_BLOCKS: [u64; 2] = [LATEST_BLOCK - 16, LATEST_BLOCK - 11];

/// A target chain on which [`WALLET`] meets every default requirement:
/// 20 MON, 300 transactions, holds the NFT, and logs in both windows.
pub fn eligible_chain() -> MockChain {
    MockChain::new()
        .reply("eth_blockNumber", quantity(LATEST_BLOCK as u128))
        .reply("eth_getBalance", quantity(20_000_000_000_000_000_000))
        .reply("eth_getTransactionCount", quantity(300))
        .reply("eth_call", json!(format!("0x{:064x}", 1)))
        .respond_with("eth_getBlockByNumber", |params| {
            let n = params.first().map(parse_quantity).unwrap_or(LATEST_BLOCK);
            MockReply::Result(json!({
                "number": format!("{n:#x}"),
                "timestamp": format!("{:#x}", block_timestamp(n)),
            }))
        })
        .respond_with("eth_getLogs", |params| {
            let from = params
                .first()
                .map(|filter| parse_quantity(&filter["fromBlock"]))
                .unwrap_or(0);
            if from == ANCHOR_BLOCK {
                MockReply::Result(json!([log(RECENT_CONTRACT_A, HISTORICAL_LOG_BLOCK)]))
            } else {
                MockReply::Result(json!([
                    log(RECENT_CONTRACT_A, RECENT_LOG_BLOCKS[0]),
                    log(RECENT_CONTRACT_B, RECENT_LOG_BLOCKS[1]),
                ]))
            }
        })
}

/// A reference chain reporting `count` sent transactions.
pub fn reference_chain(count: u128) -> MockChain {
    MockChain::new().reply("eth_getTransactionCount", quantity(count))
}

// ---------------------------------------------------------------------------
// App wiring
// ---------------------------------------------------------------------------

pub fn collector_config() -> CollectorConfig {
    CollectorConfig {
        nft_contract: WalletAddress::parse(NFT_CONTRACT).unwrap(),
        unit_decimals: 18,
        display_precision: 3,
        log_window_blocks: 100,
        historical_anchor_block: ANCHOR_BLOCK,
        historical_span_blocks: 16,
        max_block_lookups: 20,
        tx_count_ceiling: 10_000,
        first_activity_fallback: FirstActivityFallback::Conservative,
    }
}

pub fn rpc(url: &str, timeout: Duration) -> Arc<dyn JsonRpc> {
    Arc::new(HttpRpcClient::new(url, timeout).unwrap())
}

#[allow(dead_code)]
pub fn collector(target: &MockServer, reference: Option<&MockServer>, timeout: Duration) -> SignalCollector {
    SignalCollector::new(
        rpc(&target.url, timeout),
        reference.map(|r| rpc(&r.url, timeout)),
        collector_config(),
    )
}

/// Full router backed by the given mock nodes.
#[allow(dead_code)]
pub fn build_test_app(
    target: &MockServer,
    reference: Option<&MockServer>,
    timeout: Duration,
    api_token: Option<&str>,
) -> Router {
    let reports = ReportService::new(
        collector(target, reference, timeout),
        RequirementsStore::new(EligibilityRequirements::default()),
        "MON",
    );

    let state = AppState {
        reports,
        metrics_handle: walletscope::metrics::init_metrics(),
        api_token: api_token.map(Arc::from),
    };

    create_router(state)
}
