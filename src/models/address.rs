use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Serialize, Serializer};
use thiserror::Error;

const HEX_DIGITS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must start with 0x")]
    MissingPrefix,

    #[error("address must have 40 hex digits, got {0}")]
    WrongLength(usize),

    #[error("address contains a non-hex character")]
    NonHex,
}

/// A validated 20-byte EVM address, stored in canonical lowercase form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Validate against `^0x[0-9a-fA-F]{40}$` and normalise to lowercase.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let digits = raw.strip_prefix("0x").ok_or(AddressError::MissingPrefix)?;

        if digits.len() != HEX_DIGITS {
            return Err(AddressError::WrongLength(digits.len()));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AddressError::NonHex);
        }

        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 40 hex digits without the `0x` prefix.
    pub fn hex_digits(&self) -> &str {
        &self.0[2..]
    }

    /// EIP-55 mixed-case form.
    pub fn checksummed(&self) -> String {
        match Address::from_str(&self.0) {
            Ok(addr) => addr.to_checksum(None),
            Err(_) => self.0.clone(),
        }
    }

    /// Shortened `0x1234…abcd` form for log lines.
    pub fn short(&self) -> String {
        format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }

    /// Left-pad to a 32-byte word, as used in log topics and ABI call data.
    pub fn as_topic(&self) -> String {
        format!("0x{:0>64}", self.hex_digits())
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for WalletAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
