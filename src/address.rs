//! Account addresses and their bech32 rendering

use bech32::{FromBase32, ToBase32, Variant};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TxWatcherError};

/// Human-readable prefix of account addresses
pub const ADDRESS_HRP: &str = "erd";

/// Length of a raw account address in bytes
pub const ADDRESS_LEN: usize = 32;

/// A 32-byte account or contract address
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Build an address from its raw public key bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            TxWatcherError::Address(format!(
                "expected {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(raw))
    }

    /// Parse the canonical bech32 form
    pub fn from_bech32(s: &str) -> Result<Self> {
        let (hrp, data, variant) = bech32::decode(s)
            .map_err(|e| TxWatcherError::Address(format!("invalid bech32 '{}': {}", s, e)))?;
        if hrp != ADDRESS_HRP {
            return Err(TxWatcherError::Address(format!(
                "unexpected prefix '{}', expected '{}'",
                hrp, ADDRESS_HRP
            )));
        }
        if variant != Variant::Bech32 {
            return Err(TxWatcherError::Address("bech32m addresses are not supported".to_string()));
        }
        let bytes = Vec::<u8>::from_base32(&data)
            .map_err(|e| TxWatcherError::Address(format!("invalid bech32 payload: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Canonical human-readable form
    pub fn to_bech32(&self) -> String {
        // Encoding only fails for an invalid HRP, and ADDRESS_HRP is valid.
        bech32::encode(ADDRESS_HRP, self.0.to_base32(), Variant::Bech32)
            .unwrap_or_else(|_| hex::encode(self.0))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Contract addresses start with eight zero bytes
    pub fn is_smart_contract(&self) -> bool {
        self.0[..8].iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_bech32())
    }
}

impl FromStr for Address {
    type Err = TxWatcherError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bech32(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bech32())
    }
}
