use serde::Serialize;

use super::{EligibilityVerdict, SignalField, TimestampSource, WalletAddress};

/// Response body for `GET /api/wallet/{address}`.
#[derive(Debug, Clone, Serialize)]
pub struct WalletReport {
    pub address: WalletAddress,
    pub checksum_address: String,
    /// Display balance, e.g. `"12.000 MON"`.
    pub balance: String,
    /// Raw balance in the smallest unit, as a decimal string.
    pub balance_wei: String,
    pub total_transactions: u64,
    pub reference_transactions: u64,
    pub unique_contracts: u64,
    pub first_activity: String,
    pub first_activity_timestamp: i64,
    pub first_activity_source: TimestampSource,
    pub last_activity: String,
    pub last_activity_timestamp: i64,
    pub last_activity_source: TimestampSource,
    pub has_nft: bool,
    pub is_early_adopter: bool,
    pub degraded_signals: Vec<SignalField>,
    pub airdrop_eligibility: EligibilityVerdict,
}
