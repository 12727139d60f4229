use std::collections::{BTreeSet, HashSet};

use futures_util::future::join_all;

use crate::models::WalletAddress;
use crate::rpc::{BlockTag, EthClient, LogEntry, LogFilter, RpcError};
use crate::rpc::codec::parse_u64;

/// What a log query revealed about an address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityScan {
    /// Lowercased addresses of the contracts that emitted matching logs.
    pub contracts: HashSet<String>,
    pub log_count: usize,
    /// Earliest / latest block timestamps among the matching logs that
    /// could be resolved.
    pub earliest: Option<i64>,
    pub latest: Option<i64>,
}

impl ActivityScan {
    pub fn is_empty(&self) -> bool {
        self.log_count == 0
    }
}

/// Result of scanning the most recent block window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentWindow {
    pub latest_block: u64,
    /// Timestamp of `latest_block`, if the header could be fetched.
    pub latest_block_timestamp: Option<i64>,
    pub scan: ActivityScan,
}

/// Scan `[latest - window, latest]` for logs whose first indexed argument is
/// `address`.
pub async fn scan_recent(
    eth: &EthClient,
    address: &WalletAddress,
    window: u64,
    max_lookups: usize,
) -> Result<RecentWindow, RpcError> {
    let latest_block = eth.block_number().await?;
    let from_block = latest_block.saturating_sub(window);
    let filter = LogFilter::indexed_address(from_block, latest_block, address.as_topic());

    let (header, logs) = tokio::join!(
        eth.block_timestamp(BlockTag::Number(latest_block)),
        eth.get_logs(&filter),
    );

    let latest_block_timestamp = match header {
        Ok(ts) => Some(ts),
        Err(e) => {
            tracing::warn!(error = %e, latest_block, "Could not fetch latest block header");
            None
        }
    };

    let logs = logs?;
    let scan = summarize(eth, &logs, max_lookups).await;

    tracing::debug!(
        address = %address.short(),
        from_block,
        latest_block,
        logs = scan.log_count,
        contracts = scan.contracts.len(),
        "Recent window scanned"
    );

    Ok(RecentWindow {
        latest_block,
        latest_block_timestamp,
        scan,
    })
}

/// Scan a short window anchored at a fixed historical block. When matching
/// logs exist but none of their blocks can be resolved, the anchor block's
/// own timestamp stands in for them.
pub async fn scan_historical(
    eth: &EthClient,
    address: &WalletAddress,
    anchor_block: u64,
    span: u64,
    max_lookups: usize,
) -> Result<ActivityScan, RpcError> {
    let to_block = anchor_block.saturating_add(span);
    let filter = LogFilter::indexed_address(anchor_block, to_block, address.as_topic());
    let logs = eth.get_logs(&filter).await?;

    let mut scan = summarize(eth, &logs, max_lookups).await;

    if !scan.is_empty() && scan.earliest.is_none() {
        let anchor_ts = eth.block_timestamp(BlockTag::Number(anchor_block)).await?;
        scan.earliest = Some(anchor_ts);
        scan.latest = Some(anchor_ts);
    }

    tracing::debug!(
        address = %address.short(),
        anchor_block,
        logs = scan.log_count,
        earliest = ?scan.earliest,
        "Historical window scanned"
    );

    Ok(scan)
}

/// Collect contract addresses and resolve block timestamps, newest blocks
/// first, at most `max_lookups` distinct blocks. Individual header failures
/// only shrink the set of resolved timestamps.
async fn summarize(eth: &EthClient, logs: &[LogEntry], max_lookups: usize) -> ActivityScan {
    let contracts: HashSet<String> = logs
        .iter()
        .filter_map(|log| log.address.as_deref())
        .map(str::to_lowercase)
        .collect();

    let blocks: BTreeSet<u64> = logs
        .iter()
        .filter_map(|log| log.block_number.as_deref())
        .filter_map(|n| parse_u64(n).ok())
        .collect();

    let lookups = blocks
        .iter()
        .rev()
        .take(max_lookups)
        .map(|&n| eth.block_timestamp(BlockTag::Number(n)));

    let mut timestamps = Vec::new();
    for result in join_all(lookups).await {
        match result {
            Ok(ts) => timestamps.push(ts),
            Err(e) => tracing::debug!(error = %e, "Skipping unresolved log block"),
        }
    }

    ActivityScan {
        contracts,
        log_count: logs.len(),
        earliest: timestamps.iter().copied().min(),
        latest: timestamps.iter().copied().max(),
    }
}
