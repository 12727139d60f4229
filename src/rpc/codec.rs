//! Hex quantity decoding and unit scaling for JSON-RPC payloads.

use alloy::primitives::U256;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::WalletAddress;

/// Selector of `balanceOf(address)`.
pub const BALANCE_OF_SELECTOR: &str = "0x70a08231";

/// Encode a block number or other quantity as `0x`-prefixed hex.
pub fn to_quantity(n: u64) -> String {
    format!("{n:#x}")
}

/// Decode a `0x`-prefixed hex quantity into a `u64`.
pub fn parse_u64(hex: &str) -> Result<u64, String> {
    let digits = strip_prefix(hex)?;
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid quantity {hex:?}: {e}"))
}

/// Decode a `0x`-prefixed hex quantity or 32-byte word into a `U256`.
/// An empty `0x` (e.g. `eth_call` against an address with no code) is zero.
pub fn parse_u256(hex: &str) -> Result<U256, String> {
    let digits = strip_prefix(hex)?;
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).map_err(|e| format!("invalid quantity {hex:?}: {e}"))
}

fn strip_prefix(hex: &str) -> Result<&str, String> {
    hex.strip_prefix("0x")
        .ok_or_else(|| format!("quantity {hex:?} is missing the 0x prefix"))
}

/// Saturating conversion for counters that should never realistically
/// exceed `u64`.
pub fn saturate_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Convert a smallest-unit amount into whole tokens, rounded half away from
/// zero to `precision` decimal places.
pub fn scale_units(raw: U256, decimals: u32, precision: u32) -> Decimal {
    let scaled = u128::try_from(raw)
        .ok()
        .and_then(|v| i128::try_from(v).ok())
        .and_then(|v| Decimal::try_from_i128_with_scale(v, decimals).ok())
        .unwrap_or_else(|| {
            // Beyond Decimal's 96-bit mantissa: keep whole units only.
            let unit = U256::from(10u64).pow(U256::from(decimals));
            u64::try_from(raw / unit)
                .map(Decimal::from)
                .unwrap_or(Decimal::MAX)
        });

    scaled.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}

/// ABI call data for `balanceOf(owner)`.
pub fn balance_of_calldata(owner: &WalletAddress) -> String {
    format!("{BALANCE_OF_SELECTOR}{:0>64}", owner.hex_digits())
}
