use meridian_consensus::{Address, Heartbeat, ADDRESS_LEN};

const CHAIN_ID: &str = "meridian-1";

fn heartbeat() -> Heartbeat {
    Heartbeat::new(Address::new([0x42; ADDRESS_LEN]), 1, 1000, 0, 7)
}

#[test]
fn sign_bytes_is_a_32_byte_digest() {
    let digest = heartbeat().sign_bytes(CHAIN_ID).unwrap();
    assert_eq!(digest.len(), 32);
}

#[test]
fn signature_does_not_influence_sign_bytes() {
    let unsigned = heartbeat();

    let mut signed = heartbeat();
    signed.signature = vec![0xde, 0xad, 0xbe, 0xef];

    let mut other_signature = heartbeat();
    other_signature.signature = vec![0x01; 64];

    let reference = unsigned.sign_bytes(CHAIN_ID).unwrap();
    assert_eq!(signed.sign_bytes(CHAIN_ID).unwrap(), reference);
    assert_eq!(other_signature.sign_bytes(CHAIN_ID).unwrap(), reference);
}

#[test]
fn each_content_field_changes_sign_bytes() {
    let reference = heartbeat().sign_bytes(CHAIN_ID).unwrap();

    let mut changed = heartbeat();
    changed.height += 1;
    assert_ne!(changed.sign_bytes(CHAIN_ID).unwrap(), reference);

    let mut changed = heartbeat();
    changed.round = 1;
    assert_ne!(changed.sign_bytes(CHAIN_ID).unwrap(), reference);

    let mut changed = heartbeat();
    changed.sequence += 1;
    assert_ne!(changed.sign_bytes(CHAIN_ID).unwrap(), reference);

    let mut changed = heartbeat();
    changed.validator_index += 1;
    assert_ne!(changed.sign_bytes(CHAIN_ID).unwrap(), reference);

    let mut changed = heartbeat();
    changed.validator_address = Address::new([0x43; ADDRESS_LEN]);
    assert_ne!(changed.sign_bytes(CHAIN_ID).unwrap(), reference);

    assert_ne!(heartbeat().sign_bytes("meridian-2").unwrap(), reference);
}

#[test]
fn sign_bytes_is_deterministic_across_calls() {
    let hb = heartbeat();
    assert_eq!(hb.sign_bytes(CHAIN_ID).unwrap(), hb.sign_bytes(CHAIN_ID).unwrap());
}

#[test]
fn copies_are_deep_equal_and_independent() {
    let mut original = heartbeat();
    original.signature = vec![1, 2, 3];

    let copy = original.clone();
    assert_eq!(copy, original);

    let mut mutated = original.clone();
    mutated.signature = vec![9, 9, 9];
    assert_eq!(original.signature, vec![1, 2, 3]);
    assert_ne!(mutated, original);
}

#[test]
fn wire_form_uses_snake_case_fields_and_hex_bytes() {
    let mut hb = heartbeat();
    hb.signature = vec![0xab, 0xcd];

    let value = serde_json::to_value(&hb).unwrap();
    assert_eq!(value["validator_address"], serde_json::json!("42".repeat(20)));
    assert_eq!(value["validator_index"], serde_json::json!(1));
    assert_eq!(value["height"], serde_json::json!(1000));
    assert_eq!(value["round"], serde_json::json!(0));
    assert_eq!(value["sequence"], serde_json::json!(7));
    assert_eq!(value["signature"], serde_json::json!("abcd"));
}
