//! Validator identity types
//!
//! This module defines the immutable validator descriptor and the two
//! identities it is known by:
//! - `Address`: the 20-byte consensus identity, ordered by raw bytes
//! - `PeerId`: the network-layer identity used by the transport
//!
//! Validators compare equal by address; voting power and public key do
//! not participate in equality.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a validator address in bytes
pub const ADDRESS_LEN: usize = 20;

/// 20-byte validator address
///
/// Ordering is lexicographic over the raw bytes; the backup pool relies
/// on this for its deterministic promotion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Create an address from raw bytes
    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw address bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Hex fingerprint of the first 6 bytes, for log lines
    pub fn fingerprint(&self) -> String {
        crate::codec::fingerprint(&self.0)
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let raw = hex::decode(text.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
        let bytes: [u8; ADDRESS_LEN] = raw
            .try_into()
            .map_err(|_| serde::de::Error::custom("address must be 20 bytes"))?;
        Ok(Self(bytes))
    }
}

/// Network identity of a committee peer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    /// Get the identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable validator descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validator {
    /// Consensus identity
    pub address: Address,

    /// Voting power in the committee
    pub voting_power: u64,

    /// Opaque public key bytes
    #[serde(with = "crate::codec::serde_hex")]
    pub public_key: Vec<u8>,
}

impl Validator {
    /// Create a new validator descriptor
    pub fn new(address: Address, voting_power: u64, public_key: Vec<u8>) -> Self {
        Self {
            address,
            voting_power,
            public_key,
        }
    }
}

// Equality is by address only.
impl PartialEq for Validator {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Validator {}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator{{{} power:{}}}", self.address, self.voting_power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_orders_by_raw_bytes() {
        let low = Address::new([1u8; ADDRESS_LEN]);
        let high = Address::new([2u8; ADDRESS_LEN]);
        assert!(low < high);

        let mut mixed = [1u8; ADDRESS_LEN];
        mixed[19] = 2;
        assert!(Address::new(mixed) > low);
        assert!(Address::new(mixed) < high);
    }

    #[test]
    fn validator_equality_ignores_power_and_key() {
        let addr = Address::new([7u8; ADDRESS_LEN]);
        let a = Validator::new(addr, 10, vec![1, 2, 3]);
        let b = Validator::new(addr, 99, vec![4, 5, 6]);
        assert_eq!(a, b);

        let c = Validator::new(Address::new([8u8; ADDRESS_LEN]), 10, vec![1, 2, 3]);
        assert_ne!(a, c);
    }

    #[test]
    fn address_serde_round_trip() {
        let addr = Address::new([0xab; ADDRESS_LEN]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(20)));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
