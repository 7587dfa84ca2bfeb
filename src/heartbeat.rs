//! Heartbeat liveness message
//!
//! A vote-like value validators broadcast to signal they are alive and
//! waiting for transactions. The canonical signing form serializes the
//! content fields in a fixed order and never includes the signature, so
//! any two heartbeats with equal content produce byte-identical sign
//! bytes.

use crate::codec;
use crate::error::Result;
use crate::validator::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Liveness signal from one committee validator
///
/// Heartbeats are immutable once built; copies may be taken freely via
/// `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Address of the signing validator
    pub validator_address: Address,

    /// Index of the validator in the committee
    pub validator_index: u32,

    /// Fast-chain height the heartbeat refers to
    pub height: u64,

    /// Consensus round
    pub round: u32,

    /// Heartbeat sequence number within the round
    pub sequence: u32,

    /// Signature over the canonical form
    #[serde(with = "crate::codec::serde_hex")]
    pub signature: Vec<u8>,
}

// Canonical signing form. Field order is the canonical wire order and is
// fixed by the declaration order below; the signature is deliberately
// absent.
#[derive(Serialize)]
struct CanonicalHeartbeat<'a> {
    chain_id: &'a str,
    #[serde(rename = "type")]
    message_type: &'static str,
    height: u64,
    round: u32,
    sequence: u32,
    validator_address: Address,
    validator_index: u32,
}

impl Heartbeat {
    /// Create an unsigned heartbeat
    pub fn new(
        validator_address: Address,
        validator_index: u32,
        height: u64,
        round: u32,
        sequence: u32,
    ) -> Self {
        Self {
            validator_address,
            validator_index,
            height,
            round,
            sequence,
            signature: Vec::new(),
        }
    }

    /// Digest of the canonical form, for signing
    ///
    /// Two heartbeats with equal content fields produce byte-identical
    /// output regardless of their signatures.
    pub fn sign_bytes(&self, chain_id: &str) -> Result<Vec<u8>> {
        let canonical = serde_json::to_vec(&CanonicalHeartbeat {
            chain_id,
            message_type: "heartbeat",
            height: self.height,
            round: self.round,
            sequence: self.sequence,
            validator_address: self.validator_address,
            validator_index: self.validator_index,
        })?;

        Ok(codec::rlp_list_hash(&canonical).to_vec())
    }
}

impl fmt::Display for Heartbeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Heartbeat{{{}:{} {}/{:02} ({}) /{}.../}}",
            self.validator_index,
            self.validator_address.fingerprint(),
            self.height,
            self.round,
            self.sequence,
            codec::fingerprint(&self.signature)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::ADDRESS_LEN;

    #[test]
    fn canonical_form_has_fixed_field_order() {
        let json = serde_json::to_string(&CanonicalHeartbeat {
            chain_id: "meridian-1",
            message_type: "heartbeat",
            height: 7,
            round: 0,
            sequence: 2,
            validator_address: Address::new([0x11; ADDRESS_LEN]),
            validator_index: 3,
        })
        .unwrap();

        let expected = format!(
            "{{\"chain_id\":\"meridian-1\",\"type\":\"heartbeat\",\"height\":7,\
             \"round\":0,\"sequence\":2,\"validator_address\":\"{}\",\
             \"validator_index\":3}}",
            "11".repeat(20)
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn display_shows_fingerprints() {
        let mut heartbeat = Heartbeat::new(Address::new([0xab; ADDRESS_LEN]), 4, 100, 1, 9);
        heartbeat.signature = vec![0xde, 0xad, 0xbe, 0xef, 0x00, 0x11, 0x22];

        let text = heartbeat.to_string();
        assert!(text.starts_with("Heartbeat{4:ABABABABABAB 100/01 (9)"), "got: {text}");
        assert!(text.contains("/DEADBEEF0011.../"), "got: {text}");
    }
}
