//! Typed identifiers for accounts, transactions, and polls
//!
//! Thin wrappers over the raw representations so a poll id can never be
//! passed where a position index belongs, and addresses are validated once
//! at the boundary instead of being strings everywhere.

use crate::errors::AddressError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte account address, parsed from and rendered as `0x`-prefixed hex.
///
/// Shorter hex inputs are left-padded with zeros, matching how the ledger
/// normalizes addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress([u8; 32]);

impl AccountAddress {
    pub const LENGTH: usize = 32;

    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_hex(input: &str) -> Result<Self, AddressError> {
        let stripped = input.strip_prefix("0x").unwrap_or(input);
        // hex::decode needs an even digit count; short addresses are common.
        let padded = if stripped.len() % 2 == 1 {
            format!("0{stripped}")
        } else {
            stripped.to_string()
        };
        let bytes = hex::decode(&padded).map_err(|_| AddressError::InvalidHex {
            input: input.to_string(),
        })?;
        if bytes.len() > Self::LENGTH {
            return Err(AddressError::InvalidLength {
                got: bytes.len(),
                max: Self::LENGTH,
            });
        }
        let mut out = [0u8; Self::LENGTH];
        out[Self::LENGTH - bytes.len()..].copy_from_slice(&bytes);
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<AccountAddress> for String {
    fn from(addr: AccountAddress) -> Self {
        addr.to_hex()
    }
}

/// Ledger transaction hash, opaque to this layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sequential poll identifier assigned by the poll registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollId(pub u64);

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "poll#{}", self.0)
    }
}
