// ABOUTME: Tests for seed payload encoding.
// ABOUTME: Checks the ABI head layout and strict decoding of nomination arrays.

use alloy_primitives::U256;
use proxyforge::seed::{Nomination, SeedPayload, SeedSchema, decode, encode};
use proxyforge::types::Address;
use serde_json::json;

fn word(bytes: &[u8], index: usize) -> U256 {
    U256::from_be_slice(&bytes[index * 32..(index + 1) * 32])
}

fn nomination(name_id: u8, max: u8) -> Nomination {
    Nomination {
        nameId: name_id,
        max,
        participants: vec![],
        winners: vec![],
        badgeURI: String::new(),
        weaponId: 0,
        gender: 0,
    }
}

#[test]
fn payload_starts_with_offset_then_length() {
    let bytes = encode(&[nomination(0, 16), nomination(1, 20)]);

    assert_eq!(word(&bytes, 0), U256::from(0x20));
    assert_eq!(word(&bytes, 1), U256::from(2));
    assert_eq!(bytes.len() % 32, 0);
}

#[test]
fn empty_record_list_is_two_words() {
    let bytes = encode::<Nomination>(&[]);
    assert_eq!(bytes.len(), 64);
    assert_eq!(word(&bytes, 0), U256::from(0x20));
    assert_eq!(word(&bytes, 1), U256::ZERO);
}

#[test]
fn records_with_empty_lists_survive_decoding() {
    let records = [nomination(0, 16), nomination(1, 20)];
    let decoded = decode::<Nomination>(&encode(&records)).unwrap();
    assert_eq!(decoded, records);
}

#[test]
fn single_element_lists_survive_decoding() {
    let judge: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
    let mut record = nomination(2, 4);
    record.participants = vec![judge];
    record.winners = vec![judge];

    let decoded = decode::<Nomination>(&encode(std::slice::from_ref(&record))).unwrap();
    assert_eq!(decoded, vec![record]);
}

#[test]
fn addresses_and_multibyte_strings_survive_decoding() {
    let judge: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
    let mut record = nomination(3, 8);
    record.participants = vec![judge];
    record.winners = vec![judge, Address::ZERO];
    record.badgeURI = "ipfs://bafy/Кубок Ростова.json".to_string();

    let bytes = encode(std::slice::from_ref(&record));
    let decoded = decode::<Nomination>(&bytes).unwrap();

    assert_eq!(decoded, vec![record]);
}

#[test]
fn truncated_payload_fails_to_decode() {
    let bytes = encode(&[nomination(0, 16)]);
    assert!(decode::<Nomination>(&bytes[..bytes.len() - 32]).is_err());
}

#[test]
fn configured_payload_encodes_like_typed_records() {
    let payload: SeedPayload = serde_yaml::from_str(
        r#"
schema: nominations
records:
  - { nameId: 0, max: 16, participants: [], winners: [], badgeURI: "", weaponId: 0, gender: 0 }
  - { nameId: 1, max: 20, participants: [], winners: [], badgeURI: "", weaponId: 0, gender: 0 }
"#,
    )
    .unwrap();

    assert_eq!(payload.schema, SeedSchema::Nominations);
    assert_eq!(
        payload.encode().unwrap(),
        encode(&[nomination(0, 16), nomination(1, 20)])
    );
}

#[test]
fn records_with_wrong_shape_are_rejected() {
    let err = SeedSchema::Nominations
        .encode_json(&json!([{ "nameId": 0, "max": "sixteen" }]))
        .unwrap_err();
    assert!(err.to_string().contains("nominations"));
}
