use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::U256;
use chrono::Utc;
use metrics::counter;

use super::log_scan::{self, ActivityScan, RecentWindow};
use crate::models::{SignalField, TimestampSource, WalletAddress, WalletSignals};
use crate::rpc::codec::{saturate_u64, scale_units};
use crate::rpc::{EthClient, JsonRpc, RpcError};

/// What to report as first activity when the account has sent transactions
/// but neither log window shows any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstActivityFallback {
    /// `cutoff + 1`: no evidence, no early-adopter credit.
    #[default]
    Conservative,
    /// `cutoff - 1`: assume the account predates the cutoff.
    Optimistic,
}

impl FirstActivityFallback {
    pub fn sentinel(self, cutoff: i64) -> i64 {
        match self {
            FirstActivityFallback::Conservative => cutoff.saturating_add(1),
            FirstActivityFallback::Optimistic => cutoff.saturating_sub(1),
        }
    }
}

impl FromStr for FirstActivityFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(FirstActivityFallback::Conservative),
            "optimistic" => Ok(FirstActivityFallback::Optimistic),
            other => Err(format!("unknown first-activity fallback {other:?}")),
        }
    }
}

impl fmt::Display for FirstActivityFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirstActivityFallback::Conservative => f.write_str("conservative"),
            FirstActivityFallback::Optimistic => f.write_str("optimistic"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// ERC-721/ERC-20 contract whose `balanceOf` decides NFT ownership.
    pub nft_contract: WalletAddress,
    pub unit_decimals: u32,
    pub display_precision: u32,
    /// Upper bound on the recent `eth_getLogs` range; public RPCs reject
    /// larger ones.
    pub log_window_blocks: u64,
    pub historical_anchor_block: u64,
    pub historical_span_blocks: u64,
    /// Maximum distinct block headers fetched per log window.
    pub max_block_lookups: usize,
    /// Nonces above this are clamped to it.
    pub tx_count_ceiling: u64,
    pub first_activity_fallback: FirstActivityFallback,
}

/// First/last activity after fallbacks have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityTimes {
    pub first: i64,
    pub first_source: TimestampSource,
    pub last: i64,
    pub last_source: TimestampSource,
}

/// Gathers [`WalletSignals`] for one address. Never fails: every upstream
/// fault is logged and replaced by that field's default.
#[derive(Clone)]
pub struct SignalCollector {
    target: EthClient,
    reference: Option<EthClient>,
    config: CollectorConfig,
}

impl SignalCollector {
    pub fn new(
        target: Arc<dyn JsonRpc>,
        reference: Option<Arc<dyn JsonRpc>>,
        config: CollectorConfig,
    ) -> Self {
        Self {
            target: EthClient::new(target),
            reference: reference.map(EthClient::new),
            config,
        }
    }

    /// Target-chain client, for health checks.
    pub fn target(&self) -> &EthClient {
        &self.target
    }

    /// Query all signals concurrently and apply per-field defaults.
    /// `cutoff` is the early-adopter cutoff the sentinels are relative to.
    pub async fn collect(&self, address: &WalletAddress, cutoff: i64) -> WalletSignals {
        let cfg = &self.config;

        let (balance, nonce, reference, nft, recent, historical) = tokio::join!(
            self.target.get_balance(address),
            self.target.get_transaction_count(address),
            self.reference_transaction_count(address),
            self.target.token_balance_of(&cfg.nft_contract, address),
            log_scan::scan_recent(&self.target, address, cfg.log_window_blocks, cfg.max_block_lookups),
            log_scan::scan_historical(
                &self.target,
                address,
                cfg.historical_anchor_block,
                cfg.historical_span_blocks,
                cfg.max_block_lookups,
            ),
        );

        let mut degraded = Vec::new();

        let balance_wei = settle(address, SignalField::Balance, balance, U256::ZERO, &mut degraded);
        let raw_nonce = settle(address, SignalField::TransactionCount, nonce, U256::ZERO, &mut degraded);
        let nft_balance = settle(address, SignalField::NftOwnership, nft, U256::ZERO, &mut degraded);
        let recent: Option<RecentWindow> =
            settle(address, SignalField::RecentActivity, recent.map(Some), None, &mut degraded);
        let historical: Option<ActivityScan> =
            settle(address, SignalField::HistoricalActivity, historical.map(Some), None, &mut degraded);

        let reference_raw = match reference {
            Some(result) => settle(
                address,
                SignalField::ReferenceTransactionCount,
                result,
                U256::ZERO,
                &mut degraded,
            ),
            None => {
                degraded.push(SignalField::ReferenceTransactionCount);
                U256::ZERO
            }
        };

        let transaction_count = clamp_transaction_count(raw_nonce, cfg.tx_count_ceiling);
        let reference_transaction_count = clamp_transaction_count(reference_raw, cfg.tx_count_ceiling);

        let activity = resolve_activity(
            transaction_count,
            recent.as_ref(),
            historical.as_ref(),
            cutoff,
            cfg.first_activity_fallback,
            Utc::now().timestamp(),
        );

        let unique_contracts = recent
            .as_ref()
            .map(|r| r.scan.contracts.len() as u64)
            .unwrap_or(0);

        WalletSignals {
            address: address.clone(),
            balance_wei,
            balance: scale_units(balance_wei, cfg.unit_decimals, cfg.display_precision),
            transaction_count,
            reference_transaction_count,
            unique_contracts,
            first_activity_timestamp: activity.first,
            first_activity_source: activity.first_source,
            last_activity_timestamp: activity.last,
            last_activity_source: activity.last_source,
            has_required_nft: nft_balance > U256::ZERO,
            degraded,
        }
    }

    /// `None` when no reference-chain endpoint is configured.
    async fn reference_transaction_count(
        &self,
        address: &WalletAddress,
    ) -> Option<Result<U256, RpcError>> {
        match &self.reference {
            Some(eth) => Some(eth.get_transaction_count(address).await),
            None => None,
        }
    }
}

/// Unwrap a sub-signal or record it as degraded and substitute `default`.
fn settle<T>(
    address: &WalletAddress,
    field: SignalField,
    result: Result<T, RpcError>,
    default: T,
    degraded: &mut Vec<SignalField>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                address = %address.short(),
                field = %field,
                method = e.method(),
                kind = e.kind(),
                error = %e,
                "Signal unavailable, using default"
            );
            counter!("signal_fallbacks_total", "field" => field.as_str()).increment(1);
            degraded.push(field);
            default
        }
    }
}

/// Clamp implausible nonces to `ceiling`.
pub fn clamp_transaction_count(raw: U256, ceiling: u64) -> u64 {
    let count = saturate_u64(raw);
    if count > ceiling {
        tracing::warn!(raw = %raw, ceiling, "Transaction count above ceiling, clamping");
        ceiling
    } else {
        count
    }
}

/// Derive first/last activity from the two log windows, falling back to
/// proxies when the windows are empty or unavailable.
///
/// Last activity: newest recent-window observation, else the latest block's
/// timestamp when the account has sent transactions, else `now`.
///
/// First activity: the historical observation, else the earliest recent
/// one, else the policy sentinel when the account has sent transactions,
/// else `cutoff + 1`.
pub fn resolve_activity(
    transaction_count: u64,
    recent: Option<&RecentWindow>,
    historical: Option<&ActivityScan>,
    cutoff: i64,
    fallback: FirstActivityFallback,
    now: i64,
) -> ActivityTimes {
    let has_sent = transaction_count > 0;

    let (last, last_source) = match recent {
        Some(RecentWindow {
            scan: ActivityScan {
                latest: Some(ts), ..
            },
            ..
        }) => (*ts, TimestampSource::Observed),
        Some(RecentWindow {
            latest_block_timestamp: Some(ts),
            ..
        }) if has_sent => (*ts, TimestampSource::LatestBlock),
        _ => (now, TimestampSource::CurrentTime),
    };

    let observed_first = historical
        .and_then(|h| h.earliest)
        .or_else(|| recent.and_then(|r| r.scan.earliest));

    let (first, first_source) = match observed_first {
        Some(ts) => (ts, TimestampSource::Observed),
        None if has_sent => (fallback.sentinel(cutoff), TimestampSource::Sentinel),
        None => (FirstActivityFallback::Conservative.sentinel(cutoff), TimestampSource::Sentinel),
    };

    ActivityTimes {
        first,
        first_source,
        last,
        last_source,
    }
}
