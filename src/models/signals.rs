use std::fmt;

use alloy::primitives::U256;
use chrono::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::WalletAddress;

/// How an activity timestamp was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    /// Block timestamp of a matching log entry.
    Observed,
    /// Latest block timestamp, used as a lower bound when logs were empty
    /// but the account has sent transactions.
    LatestBlock,
    /// Policy sentinel relative to the early-adopter cutoff.
    Sentinel,
    /// Wall clock at collection time.
    CurrentTime,
}

/// A signal field that can fall back to its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalField {
    Balance,
    TransactionCount,
    ReferenceTransactionCount,
    NftOwnership,
    RecentActivity,
    HistoricalActivity,
}

impl SignalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalField::Balance => "balance",
            SignalField::TransactionCount => "transaction_count",
            SignalField::ReferenceTransactionCount => "reference_transaction_count",
            SignalField::NftOwnership => "nft_ownership",
            SignalField::RecentActivity => "recent_activity",
            SignalField::HistoricalActivity => "historical_activity",
        }
    }
}

impl fmt::Display for SignalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-chain facts about one wallet, gathered fresh for a single report.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletSignals {
    pub address: WalletAddress,
    pub balance_wei: U256,
    /// `balance_wei` in whole tokens, rounded to the display precision.
    pub balance: Decimal,
    pub transaction_count: u64,
    pub reference_transaction_count: u64,
    pub unique_contracts: u64,
    pub first_activity_timestamp: i64,
    pub first_activity_source: TimestampSource,
    pub last_activity_timestamp: i64,
    pub last_activity_source: TimestampSource,
    pub has_required_nft: bool,
    /// Fields replaced by their default because the upstream query failed.
    pub degraded: Vec<SignalField>,
}

impl WalletSignals {
    /// Activity strictly before `cutoff`.
    pub fn is_early_adopter(&self, cutoff: i64) -> bool {
        self.first_activity_timestamp < cutoff
    }
}

/// Render Unix seconds as e.g. `"Feb 26, 2024"` (UTC).
pub fn format_timestamp(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| ts.to_string())
}
