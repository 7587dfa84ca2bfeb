//! Canonical encoding helpers
//!
//! Hashing and text encodings shared by the wire value objects. Kept as
//! free functions so every caller names its serializer explicitly; there
//! is no process-wide codec state.

use serde::{Deserialize, Deserializer, Serializer};
use sha3::{Digest, Keccak256};

/// Number of bytes rendered by [`fingerprint`]
pub const FINGERPRINT_LEN: usize = 6;

/// Keccak-256 digest of `data`
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Keccak-256 of the RLP encoding of the one-item list `[payload]`
///
/// This is the canonical signing digest: the payload bytes are wrapped in
/// a length-prefixed RLP list before hashing, so the digest commits to
/// the payload's framing as well as its content.
pub fn rlp_list_hash(payload: &[u8]) -> [u8; 32] {
    let mut item = Vec::with_capacity(payload.len() + 9);
    rlp_encode_bytes(&mut item, payload);

    let mut encoded = Vec::with_capacity(item.len() + 9);
    rlp_encode_length(&mut encoded, item.len(), 0xc0);
    encoded.extend_from_slice(&item);

    keccak256(&encoded)
}

/// RLP-encode a byte string into `out`
fn rlp_encode_bytes(out: &mut Vec<u8>, data: &[u8]) {
    if data.len() == 1 && data[0] < 0x80 {
        out.push(data[0]);
    } else {
        rlp_encode_length(out, data.len(), 0x80);
        out.extend_from_slice(data);
    }
}

/// RLP length prefix for a payload of `len` bytes with the given base offset
fn rlp_encode_length(out: &mut Vec<u8>, len: usize, offset: u8) {
    if len <= 55 {
        out.push(offset + len as u8);
    } else {
        let be = len.to_be_bytes();
        let first = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
        let len_bytes = &be[first..];
        out.push(offset + 55 + len_bytes.len() as u8);
        out.extend_from_slice(len_bytes);
    }
}

/// Uppercase hex of the first [`FINGERPRINT_LEN`] bytes
pub fn fingerprint(bytes: &[u8]) -> String {
    let end = bytes.len().min(FINGERPRINT_LEN);
    hex::encode_upper(&bytes[..end])
}

/// Serde adaptor rendering byte fields as hex strings
pub(crate) mod serde_hex {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rlp_bytes(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        rlp_encode_bytes(&mut out, data);
        out
    }

    #[test]
    fn rlp_single_byte_below_0x80_is_itself() {
        assert_eq!(rlp_bytes(&[0x7f]), vec![0x7f]);
        assert_eq!(rlp_bytes(&[0x00]), vec![0x00]);
    }

    #[test]
    fn rlp_short_string() {
        // "dog" -> [0x83, 'd', 'o', 'g']
        assert_eq!(rlp_bytes(b"dog"), vec![0x83, b'd', b'o', b'g']);
        // empty string -> 0x80
        assert_eq!(rlp_bytes(b""), vec![0x80]);
    }

    #[test]
    fn rlp_long_string_uses_length_of_length() {
        let data = vec![0x61u8; 56];
        let encoded = rlp_bytes(&data);
        assert_eq!(encoded[0], 0xb8);
        assert_eq!(encoded[1], 56);
        assert_eq!(&encoded[2..], data.as_slice());
    }

    #[test]
    fn keccak256_empty_input_matches_reference() {
        let digest = keccak256(b"");
        assert_eq!(
            hex::encode(digest),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn list_hash_differs_from_bare_hash() {
        let payload = b"heartbeat payload";
        assert_ne!(rlp_list_hash(payload), keccak256(payload));
    }

    #[test]
    fn fingerprint_truncates_and_uppercases() {
        assert_eq!(fingerprint(&[0xab, 0xcd, 0xef, 0x01, 0x23, 0x45, 0x67]), "ABCDEF012345");
        assert_eq!(fingerprint(&[0xab]), "AB");
        assert_eq!(fingerprint(&[]), "");
    }
}
